// Copyright (C) Brian G. Milnes 2025

//! Type resolution against a method catalog
//!
//! The engine never sees a full compiler front end; it resolves call targets
//! and argument types through the `TypeResolution` seam. The bundled
//! `FileResolver` combines a per-file import table, a method catalog (the
//! "classpath"), and a lightweight local-binding scan. Anything it cannot
//! prove is `UnresolvedType`, and the matcher fails closed on that.

pub mod resolver {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use ra_ap_syntax::{
        ast,
        ast::{AstNode, HasArgList, HasName},
        Direction, SyntaxKind, SyntaxNode,
    };

    use crate::errors::errors::RewriteError;
    use crate::parser::parser::ParsedFile;
    use crate::types::types::TypeRef;

    /// A concrete method signature known to the catalog.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct MethodSig {
        pub owner: String,
        pub name: String,
        pub params: Vec<TypeRef>,
        pub ret: TypeRef,
        pub variadic: bool,
    }

    impl MethodSig {
        pub fn new(owner: &str, name: &str, params: &[TypeRef], ret: TypeRef) -> MethodSig {
            MethodSig {
                owner: owner.to_string(),
                name: name.to_string(),
                params: params.to_vec(),
                ret,
                variadic: false,
            }
        }

        pub fn qualified_name(&self) -> String {
            format!("{}::{}", self.owner, self.name)
        }
    }

    /// The set of signatures resolution can target, plus a supertype table
    /// for subtype-aware parameter compatibility.
    #[derive(Debug, Clone, Default)]
    pub struct MethodCatalog {
        sigs: Vec<MethodSig>,
        supertypes: HashMap<String, Vec<String>>,
    }

    impl MethodCatalog {
        pub fn new() -> MethodCatalog {
            MethodCatalog::default()
        }

        pub fn add(&mut self, sig: MethodSig) -> &mut MethodCatalog {
            self.sigs.push(sig);
            self
        }

        /// Declare `sub` assignable where `sup` is expected.
        pub fn add_supertype(&mut self, sub: &str, sup: &str) -> &mut MethodCatalog {
            self.supertypes
                .entry(sub.to_string())
                .or_default()
                .push(sup.to_string());
            self
        }

        pub fn candidates(&self, owner: &str, name: &str) -> Vec<&MethodSig> {
            self.sigs
                .iter()
                .filter(|s| s.owner == owner && s.name == name)
                .collect()
        }

        /// Names the given owner exports, for star-import bookkeeping.
        pub fn member_names(&self, owner: &str) -> Vec<&str> {
            self.sigs
                .iter()
                .filter(|s| s.owner == owner)
                .map(|s| s.name.as_str())
                .collect()
        }

        /// Subtype-aware assignability: `from` may be used where `to` is
        /// expected. `Any` accepts everything.
        pub fn is_assignable(&self, from: &TypeRef, to: &TypeRef) -> bool {
            if matches!(to, TypeRef::Any) || from == to {
                return true;
            }
            if let (TypeRef::Named(sub), TypeRef::Named(sup)) = (from, to) {
                return self.named_supertype(sub, sup);
            }
            false
        }

        fn named_supertype(&self, sub: &str, sup: &str) -> bool {
            let Some(direct) = self.supertypes.get(sub) else {
                return false;
            };
            direct
                .iter()
                .any(|s| s == sup || self.named_supertype(s, sup))
        }
    }

    /// What a file's use-items bind: local name -> full path, plus the
    /// star-imported module paths.
    #[derive(Debug, Clone, Default)]
    pub struct ImportTable {
        exact: HashMap<String, String>,
        stars: Vec<String>,
    }

    impl ImportTable {
        pub fn build(file: &ParsedFile) -> ImportTable {
            let mut table = ImportTable::default();
            for node in file.syntax().descendants() {
                if let Some(use_item) = ast::Use::cast(node) {
                    if let Some(tree) = use_item.use_tree() {
                        table.walk("", &tree);
                    }
                }
            }
            table
        }

        fn walk(&mut self, prefix: &str, tree: &ast::UseTree) {
            let path_text = tree
                .path()
                .map(|p| p.syntax().text().to_string())
                .unwrap_or_default();
            let full = join_path(prefix, &path_text);
            if tree.star_token().is_some() {
                self.stars.push(full);
            } else if let Some(list) = tree.use_tree_list() {
                for inner in list.use_trees() {
                    self.walk(&full, &inner);
                }
            } else if !full.is_empty() {
                let local = tree
                    .rename()
                    .and_then(|r| r.name())
                    .map(|n| n.text().to_string())
                    .unwrap_or_else(|| last_segment(&full).to_string());
                self.exact.insert(local, full);
            }
        }

        pub fn lookup(&self, local_name: &str) -> Option<&str> {
            self.exact.get(local_name).map(String::as_str)
        }

        pub fn star_modules(&self) -> &[String] {
            &self.stars
        }

        /// True if `path` is already visible unqualified: bound exactly or
        /// covered by a star import of its parent.
        pub fn covers(&self, path: &str) -> bool {
            let name = last_segment(path);
            if self.exact.get(name).is_some_and(|full| full == path) {
                return true;
            }
            match path.rsplit_once("::") {
                Some((parent, _)) => self.stars.iter().any(|s| s == parent),
                None => false,
            }
        }
    }

    pub fn join_path(prefix: &str, rest: &str) -> String {
        match (prefix.is_empty(), rest.is_empty()) {
            (true, _) => rest.to_string(),
            (_, true) => prefix.to_string(),
            _ => format!("{prefix}::{rest}"),
        }
    }

    pub fn last_segment(path: &str) -> &str {
        path.rsplit("::").next().unwrap_or(path)
    }

    /// An argument subtree captured from a matched call, with its resolved
    /// type. Bound into a template, then discarded.
    #[derive(Debug, Clone)]
    pub struct Capture {
        pub node: SyntaxNode,
        pub ty: TypeRef,
    }

    impl Capture {
        /// Original text of the subtree, formatting and comments included.
        /// A comment in trailing-trivia position (between the expression and
        /// the next `,` or `)`) sits outside the expression node, so the
        /// span extends over trailing siblings up to the last such comment.
        pub fn text(&self) -> String {
            let mut out = self.node.text().to_string();
            let mut pending = String::new();
            for element in self.node.siblings_with_tokens(Direction::Next).skip(1) {
                let Some(token) = element.into_token() else {
                    break;
                };
                match token.kind() {
                    SyntaxKind::WHITESPACE => pending.push_str(token.text()),
                    SyntaxKind::COMMENT => {
                        pending.push_str(token.text());
                        out.push_str(&pending);
                        pending.clear();
                    }
                    _ => break,
                }
            }
            out
        }
    }

    /// A call resolved to a concrete catalog signature plus its typed
    /// arguments.
    #[derive(Debug, Clone)]
    pub struct ResolvedCall {
        pub sig: MethodSig,
        pub args: Vec<Capture>,
    }

    /// Seam to the type-resolution collaborator.
    pub trait TypeResolution {
        fn resolve_call(&self, call: &ast::CallExpr) -> Result<ResolvedCall, RewriteError>;
        fn type_of(&self, expr: &ast::Expr) -> Result<TypeRef, RewriteError>;
    }

    /// Catalog-backed resolver for one file revision. Resolved types are
    /// cached per node range within the revision.
    pub struct FileResolver<'a> {
        file: &'a ParsedFile,
        catalog: &'a MethodCatalog,
        imports: ImportTable,
        cache: RefCell<HashMap<(usize, usize), TypeRef>>,
    }

    impl<'a> FileResolver<'a> {
        pub fn new(file: &'a ParsedFile, catalog: &'a MethodCatalog) -> FileResolver<'a> {
            FileResolver {
                file,
                catalog,
                imports: ImportTable::build(file),
                cache: RefCell::new(HashMap::new()),
            }
        }

        pub fn imports(&self) -> &ImportTable {
            &self.imports
        }

        /// Resolve a spelled callee path to (owner, name) through the
        /// import table.
        fn resolve_path(&self, spelled: &str) -> Option<(String, String)> {
            let segs: Vec<&str> = spelled.split("::").map(str::trim).collect();
            match segs.len() {
                0 => None,
                1 => {
                    let name = segs[0];
                    if let Some(full) = self.imports.lookup(name) {
                        let (owner, real_name) = full.rsplit_once("::")?;
                        return Some((owner.to_string(), real_name.to_string()));
                    }
                    // Star imports: usable only when exactly one module
                    // exports the name.
                    let owners: Vec<&String> = self
                        .imports
                        .star_modules()
                        .iter()
                        .filter(|m| !self.catalog.candidates(m, name).is_empty())
                        .collect();
                    match owners.as_slice() {
                        [only] => Some(((*only).clone(), name.to_string())),
                        _ => None,
                    }
                }
                _ => {
                    let name = segs[segs.len() - 1].to_string();
                    let mut owner_segs: Vec<String> =
                        segs[..segs.len() - 1].iter().map(|s| s.to_string()).collect();
                    // The leading segment may itself be an imported alias.
                    if let Some(full) = self.imports.lookup(&owner_segs[0]) {
                        owner_segs[0] = full.to_string();
                    }
                    Some((owner_segs.join("::"), name))
                }
            }
        }

        /// Pick the concrete signature for (owner, name) given the call's
        /// argument types: first by declared arity, then by argument
        /// assignability. Zero or more than one survivor is unresolved.
        fn select_signature(
            &self,
            owner: &str,
            name: &str,
            arg_types: &[TypeRef],
        ) -> Option<MethodSig> {
            let argc = arg_types.len();
            let mut survivors: Vec<&MethodSig> = self
                .catalog
                .candidates(owner, name)
                .into_iter()
                .filter(|s| {
                    if s.variadic {
                        argc >= s.params.len()
                    } else {
                        argc == s.params.len()
                    }
                })
                .collect();
            if survivors.len() > 1 {
                survivors.retain(|s| {
                    s.params
                        .iter()
                        .zip(arg_types.iter())
                        .all(|(want, got)| self.catalog.is_assignable(got, want))
                });
            }
            if survivors.len() > 1 {
                // Exact-arity declarations win over variadic ones.
                let fixed: Vec<&&MethodSig> = survivors.iter().filter(|s| !s.variadic).collect();
                if fixed.len() == 1 {
                    return Some((*fixed[0]).clone());
                }
                return None;
            }
            survivors.first().map(|s| (*s).clone())
        }

        fn type_of_literal(&self, lit: &ast::Literal) -> TypeRef {
            match lit.kind() {
                ast::LiteralKind::Bool(_) => TypeRef::Bool,
                ast::LiteralKind::String(_) => TypeRef::Str,
                ast::LiteralKind::IntNumber(n) => match n.suffix() {
                    Some("f32") | Some("f64") => TypeRef::Float,
                    _ => TypeRef::Int,
                },
                ast::LiteralKind::FloatNumber(_) => TypeRef::Float,
                ast::LiteralKind::Char(_) => TypeRef::Named("char".to_string()),
                ast::LiteralKind::Byte(_) => TypeRef::Int,
                _ => TypeRef::Unknown,
            }
        }

        /// Scan the enclosing function for what a bare identifier means:
        /// the latest `let` binding before the use, else a parameter.
        fn type_of_local(&self, ident: &str, at: usize) -> TypeRef {
            let Some(node) = self
                .file
                .syntax()
                .descendants()
                .filter(|n| {
                    usize::from(n.text_range().start()) <= at
                        && at <= usize::from(n.text_range().end())
                })
                .find_map(ast::Fn::cast)
            else {
                return TypeRef::Unknown;
            };

            let mut best: Option<(usize, TypeRef)> = None;
            for stmt in node.syntax().descendants().filter_map(ast::LetStmt::cast) {
                let range = stmt.syntax().text_range();
                let end: usize = range.end().into();
                if end > at {
                    continue;
                }
                let Some(ast::Pat::IdentPat(pat)) = stmt.pat() else {
                    continue;
                };
                if pat.name().map(|n| n.text().to_string()).as_deref() != Some(ident) {
                    continue;
                }
                let ty = match stmt.ty() {
                    Some(ann) => TypeRef::parse(&ann.syntax().text().to_string()),
                    None => stmt
                        .initializer()
                        .map(|init| self.type_of_expr(&init))
                        .unwrap_or(TypeRef::Unknown),
                };
                let start: usize = range.start().into();
                if best.as_ref().map_or(true, |(s, _)| start >= *s) {
                    best = Some((start, ty));
                }
            }
            if let Some((_, ty)) = best {
                return ty;
            }

            if let Some(params) = node.param_list() {
                for param in params.params() {
                    if let Some(ast::Pat::IdentPat(pat)) = param.pat() {
                        if pat.name().map(|n| n.text().to_string()).as_deref() == Some(ident) {
                            if let Some(ty) = param.ty() {
                                return TypeRef::parse(&ty.syntax().text().to_string());
                            }
                        }
                    }
                }
            }
            TypeRef::Unknown
        }

        fn type_of_item_binding(&self, ident: &str) -> TypeRef {
            for node in self.file.syntax().descendants() {
                if let Some(konst) = ast::Const::cast(node.clone()) {
                    if konst.name().map(|n| n.text().to_string()).as_deref() == Some(ident) {
                        if let Some(ty) = konst.ty() {
                            return TypeRef::parse(&ty.syntax().text().to_string());
                        }
                    }
                } else if let Some(stat) = ast::Static::cast(node) {
                    if stat.name().map(|n| n.text().to_string()).as_deref() == Some(ident) {
                        if let Some(ty) = stat.ty() {
                            return TypeRef::parse(&ty.syntax().text().to_string());
                        }
                    }
                }
            }
            TypeRef::Unknown
        }

        fn type_of_expr(&self, expr: &ast::Expr) -> TypeRef {
            let range = expr.syntax().text_range();
            let key = (range.start().into(), range.end().into());
            if let Some(cached) = self.cache.borrow().get(&key) {
                return cached.clone();
            }
            let ty = self.type_of_expr_uncached(expr);
            self.cache.borrow_mut().insert(key, ty.clone());
            ty
        }

        fn type_of_expr_uncached(&self, expr: &ast::Expr) -> TypeRef {
            match expr {
                ast::Expr::Literal(lit) => self.type_of_literal(lit),
                ast::Expr::ParenExpr(p) => p
                    .expr()
                    .map(|e| self.type_of_expr(&e))
                    .unwrap_or(TypeRef::Unknown),
                ast::Expr::RefExpr(r) => r
                    .expr()
                    .map(|e| self.type_of_expr(&e))
                    .unwrap_or(TypeRef::Unknown),
                ast::Expr::PrefixExpr(p) => match p.op_kind() {
                    Some(ast::UnaryOp::Not) => TypeRef::Bool,
                    Some(ast::UnaryOp::Neg) | Some(ast::UnaryOp::Deref) => p
                        .expr()
                        .map(|e| self.type_of_expr(&e))
                        .unwrap_or(TypeRef::Unknown),
                    None => TypeRef::Unknown,
                },
                ast::Expr::BinExpr(b) => match b.op_kind() {
                    Some(ast::BinaryOp::LogicOp(_)) | Some(ast::BinaryOp::CmpOp(_)) => {
                        TypeRef::Bool
                    }
                    _ => TypeRef::Unknown,
                },
                ast::Expr::ClosureExpr(_) => TypeRef::Named("closure".to_string()),
                ast::Expr::MacroExpr(m) => {
                    let is_format = m
                        .macro_call()
                        .and_then(|mc| mc.path())
                        .map(|p| p.syntax().text().to_string() == "format")
                        .unwrap_or(false);
                    if is_format {
                        TypeRef::Str
                    } else {
                        TypeRef::Unknown
                    }
                }
                ast::Expr::MethodCallExpr(m) => {
                    let name = m
                        .name_ref()
                        .map(|n| n.text().to_string())
                        .unwrap_or_default();
                    if name == "to_string" {
                        return TypeRef::Str;
                    }
                    let recv = match m.receiver() {
                        Some(r) => self.type_of_expr(&r),
                        None => return TypeRef::Unknown,
                    };
                    if let TypeRef::Named(owner) = recv {
                        if let Some(sig) = self.select_signature(&owner, &name, &[]) {
                            return sig.ret;
                        }
                        // Arity-insensitive fallback for unique names.
                        let cands = self.catalog.candidates(&owner, &name);
                        if cands.len() == 1 {
                            return cands[0].ret.clone();
                        }
                    }
                    TypeRef::Unknown
                }
                ast::Expr::CallExpr(call) => match self.resolve_call(call) {
                    Ok(resolved) => resolved.sig.ret,
                    Err(_) => TypeRef::Unknown,
                },
                ast::Expr::PathExpr(p) => {
                    let Some(path) = p.path() else {
                        return TypeRef::Unknown;
                    };
                    let text = path.syntax().text().to_string();
                    if text.contains("::") {
                        return TypeRef::Unknown;
                    }
                    let at: usize = p.syntax().text_range().start().into();
                    let local = self.type_of_local(&text, at);
                    if !local.is_unknown() {
                        return local;
                    }
                    self.type_of_item_binding(&text)
                }
                _ => TypeRef::Unknown,
            }
        }
    }

    impl TypeResolution for FileResolver<'_> {
        fn resolve_call(&self, call: &ast::CallExpr) -> Result<ResolvedCall, RewriteError> {
            let callee = match call.expr() {
                Some(ast::Expr::PathExpr(p)) => p,
                _ => {
                    return Err(RewriteError::UnresolvedType(
                        call.syntax().text().to_string(),
                    ))
                }
            };
            let spelled = callee
                .path()
                .map(|p| p.syntax().text().to_string())
                .ok_or_else(|| RewriteError::UnresolvedType(callee.syntax().text().to_string()))?;
            let (owner, name) = self
                .resolve_path(&spelled)
                .ok_or_else(|| RewriteError::UnresolvedType(spelled.clone()))?;

            let mut args = Vec::new();
            if let Some(list) = call.arg_list() {
                for arg in list.args() {
                    let ty = self.type_of(&arg)?;
                    args.push(Capture {
                        node: arg.syntax().clone(),
                        ty,
                    });
                }
            }

            let arg_types: Vec<TypeRef> = args.iter().map(|c| c.ty.clone()).collect();
            let sig = self
                .select_signature(&owner, &name, &arg_types)
                .ok_or_else(|| RewriteError::UnresolvedType(spelled))?;
            Ok(ResolvedCall { sig, args })
        }

        /// Fails closed: an expression the resolver cannot type is an error,
        /// never a silent `Unknown`.
        fn type_of(&self, expr: &ast::Expr) -> Result<TypeRef, RewriteError> {
            let ty = self.type_of_expr(expr);
            if ty.is_unknown() {
                return Err(RewriteError::UnresolvedType(
                    expr.syntax().text().to_string(),
                ));
            }
            Ok(ty)
        }
    }
}
