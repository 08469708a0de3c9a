//! Declarative type catalogue
//!
//! The catalogue is the type universe of the local semantic model. Types are
//! keyed by metadata name (``Task`1`` for `Task<TResult>`); member signatures
//! are written as type strings and may refer to the declaring type's
//! parameters. Extension methods are attached to a receiver type and share its
//! type parameters.
//!
//! Catalogues can be extended from configuration:
//!
//! ```json
//! {
//!   "types": [
//!     {
//!       "name": "Lazy",
//!       "typeParameters": ["T"],
//!       "members": [{ "name": "Value", "kind": "property", "type": "T" }]
//!     }
//!   ]
//! }
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{MemberSymbol, TypeRef, metadata_name};
use crate::{RecastError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Method,
    Property,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Accessibility {
    #[default]
    Public,
    Internal,
    Protected,
    Private,
}

/// A member signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberDecl {
    pub name: String,

    pub kind: MemberKind,

    /// Parameter types, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,

    /// Return type of a method or value type of a property
    #[serde(rename = "type")]
    #[schemars(description = "Return type of a method or value type of a property")]
    pub ty: String,

    #[serde(default)]
    pub accessibility: Accessibility,

    #[serde(default)]
    pub is_static: bool,
}

impl MemberDecl {
    pub fn method(name: &str, parameters: &[&str], returns: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: MemberKind::Method,
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            ty: returns.to_string(),
            accessibility: Accessibility::Public,
            is_static: false,
        }
    }

    pub fn property(name: &str, ty: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: MemberKind::Property,
            parameters: Vec::new(),
            ty: ty.to_string(),
            accessibility: Accessibility::Public,
            is_static: false,
        }
    }

    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    /// Resolve against the declaring type's parameters
    fn bind(
        &self,
        containing_type: &TypeRef,
        type_parameters: &[String],
        is_extension: bool,
    ) -> Option<MemberSymbol> {
        let subst =
            |text: &str| TypeRef::parse(text).map(|ty| ty.substitute(type_parameters, &containing_type.args));

        Some(MemberSymbol {
            name: self.name.clone(),
            kind: self.kind,
            containing_type: containing_type.clone(),
            parameters: self
                .parameters
                .iter()
                .map(|p| subst(p))
                .collect::<Option<Vec<_>>>()?,
            ty: subst(&self.ty)?,
            accessibility: self.accessibility,
            is_static: self.is_static,
            is_extension,
        })
    }
}

/// A named type and its members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TypeDecl {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<String>,

    #[serde(default)]
    pub members: Vec<MemberDecl>,
}

impl TypeDecl {
    pub fn new(name: &str, type_parameters: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            type_parameters: type_parameters.iter().map(|p| p.to_string()).collect(),
            members: Vec::new(),
        }
    }

    pub fn member(mut self, member: MemberDecl) -> Self {
        self.members.push(member);
        self
    }

    pub fn metadata_name(&self) -> String {
        metadata_name(&self.name, self.type_parameters.len())
    }
}

/// An extension method callable on instances of `receiver`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionDecl {
    /// Metadata name of the extended type, e.g. ``Task`1``
    pub receiver: String,

    /// Bound to the receiver's type arguments, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<String>,

    pub method: MemberDecl,
}

/// Type universe of a [`LocalSemanticModel`](super::LocalSemanticModel)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TypeCatalog {
    #[serde(default)]
    pub types: Vec<TypeDecl>,

    #[serde(default)]
    pub extensions: Vec<ExtensionDecl>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primitive types plus the task-based asynchronous pattern types
    pub fn with_task_types() -> Self {
        let awaiter = |name: &str, params: &[&str], result: &str| {
            TypeDecl::new(name, params)
                .member(MemberDecl::property("IsCompleted", "bool"))
                .member(MemberDecl::method("GetResult", &[], result))
        };

        let mut catalog = Self::new();
        for primitive in ["void", "bool", "int", "string", "object"] {
            catalog.add_type(TypeDecl::new(primitive, &[]));
        }

        catalog.add_type(
            TypeDecl::new("Task", &[])
                .member(MemberDecl::method("GetAwaiter", &[], "TaskAwaiter"))
                .member(MemberDecl::method(
                    "ConfigureAwait",
                    &["bool"],
                    "ConfiguredTaskAwaitable",
                ))
                .member(MemberDecl::method("Delay", &["int"], "Task").with_static())
                .member(MemberDecl::property("CompletedTask", "Task").with_static())
                .member(MemberDecl::property("IsCompleted", "bool")),
        );
        catalog.add_type(
            TypeDecl::new("Task", &["TResult"])
                .member(MemberDecl::method("GetAwaiter", &[], "TaskAwaiter<TResult>"))
                .member(MemberDecl::method(
                    "ConfigureAwait",
                    &["bool"],
                    "ConfiguredTaskAwaitable<TResult>",
                ))
                .member(MemberDecl::property("Result", "TResult"))
                .member(MemberDecl::property("IsCompleted", "bool")),
        );
        catalog.add_type(awaiter("TaskAwaiter", &[], "void"));
        catalog.add_type(awaiter("TaskAwaiter", &["TResult"], "TResult"));

        catalog.add_type(
            TypeDecl::new("ConfiguredTaskAwaitable", &[]).member(MemberDecl::method(
                "GetAwaiter",
                &[],
                "ConfiguredTaskAwaiter",
            )),
        );
        catalog.add_type(
            TypeDecl::new("ConfiguredTaskAwaitable", &["TResult"]).member(MemberDecl::method(
                "GetAwaiter",
                &[],
                "ConfiguredTaskAwaiter<TResult>",
            )),
        );
        catalog.add_type(awaiter("ConfiguredTaskAwaiter", &[], "void"));
        catalog.add_type(awaiter("ConfiguredTaskAwaiter", &["TResult"], "TResult"));

        catalog.add_type(
            TypeDecl::new("ValueTask", &["TResult"])
                .member(MemberDecl::method(
                    "GetAwaiter",
                    &[],
                    "ValueTaskAwaiter<TResult>",
                ))
                .member(MemberDecl::method(
                    "ConfigureAwait",
                    &["bool"],
                    "ConfiguredValueTaskAwaitable<TResult>",
                ))
                .member(MemberDecl::property("Result", "TResult")),
        );
        catalog.add_type(awaiter("ValueTaskAwaiter", &["TResult"], "TResult"));
        catalog.add_type(
            TypeDecl::new("ConfiguredValueTaskAwaitable", &["TResult"]).member(
                MemberDecl::method("GetAwaiter", &[], "ConfiguredValueTaskAwaiter<TResult>"),
            ),
        );
        catalog.add_type(awaiter("ConfiguredValueTaskAwaiter", &["TResult"], "TResult"));

        catalog
    }

    /// Add or replace a type declaration
    pub fn add_type(&mut self, decl: TypeDecl) {
        let key = decl.metadata_name();
        self.types.retain(|existing| existing.metadata_name() != key);
        self.types.push(decl);
    }

    pub fn add_extension(&mut self, extension: ExtensionDecl) {
        self.extensions.push(extension);
    }

    /// Declarations of `other` win over existing ones with the same key
    pub fn merge(&mut self, other: TypeCatalog) {
        for decl in other.types {
            self.add_type(decl);
        }
        self.extensions.extend(other.extensions);
    }

    pub fn find(&self, metadata_name: &str) -> Option<&TypeDecl> {
        self.types
            .iter()
            .find(|decl| decl.metadata_name() == metadata_name)
    }

    pub fn contains(&self, metadata_name: &str) -> bool {
        self.find(metadata_name).is_some()
    }

    /// Members named `name` declared on `ty`
    pub fn declared_members(&self, ty: &TypeRef, name: &str) -> Vec<MemberSymbol> {
        let Some(decl) = self.find(&ty.metadata_name()) else {
            return Vec::new();
        };
        decl.members
            .iter()
            .filter(|member| member.name == name)
            .filter_map(|member| member.bind(ty, &decl.type_parameters, false))
            .collect()
    }

    /// Extension methods named `name` registered for `ty`
    pub fn extension_methods(&self, ty: &TypeRef, name: &str) -> Vec<MemberSymbol> {
        let key = ty.metadata_name();
        self.extensions
            .iter()
            .filter(|ext| ext.receiver == key && ext.method.name == name)
            .filter_map(|ext| ext.method.bind(ty, &ext.type_parameters, true))
            .collect()
    }

    /// Check that every type string parses and every reference resolves
    pub fn validate(&self) -> Result<()> {
        let mut known: Vec<String> = self.types.iter().map(TypeDecl::metadata_name).collect();
        known.sort();

        let check = |text: &str, params: &[String], context: &str| -> Result<()> {
            let ty = TypeRef::parse(text).ok_or_else(|| {
                RecastError::config_error(format!("{context}: invalid type '{text}'"))
            })?;
            check_resolves(&ty, params, &known, context)
        };

        for decl in &self.types {
            for member in &decl.members {
                let context = format!("{}.{}", decl.name, member.name);
                check(&member.ty, &decl.type_parameters, &context)?;
                for param in &member.parameters {
                    check(param, &decl.type_parameters, &context)?;
                }
            }
        }

        for ext in &self.extensions {
            let context = format!("extension {}.{}", ext.receiver, ext.method.name);
            if known.binary_search(&ext.receiver).is_err() {
                return Err(RecastError::config_error(format!(
                    "{context}: unknown receiver type '{}'",
                    ext.receiver
                )));
            }
            check(&ext.method.ty, &ext.type_parameters, &context)?;
            for param in &ext.method.parameters {
                check(param, &ext.type_parameters, &context)?;
            }
        }

        Ok(())
    }
}

fn check_resolves(ty: &TypeRef, params: &[String], known: &[String], context: &str) -> Result<()> {
    let is_param = ty.args.is_empty() && params.contains(&ty.name);
    if !is_param && known.binary_search(&ty.metadata_name()).is_err() {
        return Err(RecastError::config_error(format!(
            "{context}: unknown type '{ty}'"
        )));
    }
    ty.args
        .iter()
        .try_for_each(|arg| check_resolves(arg, params, known, context))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_types_are_consistent() {
        let catalog = TypeCatalog::with_task_types();
        catalog.validate().unwrap();
        assert!(catalog.contains("ConfiguredTaskAwaitable`1"));
        assert!(catalog.contains("Task"));
        assert!(!catalog.contains("Task`2"));
    }

    #[test]
    fn test_generic_members_are_substituted() {
        let catalog = TypeCatalog::with_task_types();
        let task_of_int = TypeRef::parse("Task<int>").unwrap();

        let members = catalog.declared_members(&task_of_int, "ConfigureAwait");
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].ty.to_string(), "ConfiguredTaskAwaitable<int>");
        assert!(members[0].has_single_parameter("bool"));
    }

    #[test]
    fn test_extension_methods() {
        let mut catalog = TypeCatalog::with_task_types();
        catalog.add_type(TypeDecl::new("CancellationToken", &[]));
        catalog.add_extension(ExtensionDecl {
            receiver: "Task`1".into(),
            type_parameters: vec!["T".into()],
            method: MemberDecl::method("WithCancellation", &["CancellationToken"], "Task<T>"),
        });
        catalog.validate().unwrap();

        let ty = TypeRef::parse("Task<string>").unwrap();
        let found = catalog.extension_methods(&ty, "WithCancellation");
        assert_eq!(found.len(), 1);
        assert!(found[0].is_extension);
        assert_eq!(found[0].ty.to_string(), "Task<string>");
        assert!(catalog.extension_methods(&TypeRef::named("Task"), "WithCancellation").is_empty());
    }

    #[test]
    fn test_validate_reports_unknown_types() {
        let mut catalog = TypeCatalog::new();
        catalog.add_type(
            TypeDecl::new("Widget", &[]).member(MemberDecl::property("Size", "Dimension")),
        );
        let err = catalog.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Widget.Size: unknown type 'Dimension'"
        );
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"{
            "types": [
                { "name": "Lazy", "typeParameters": ["T"],
                  "members": [{ "name": "Value", "kind": "property", "type": "T" }] }
            ]
        }"#;
        let catalog: TypeCatalog = serde_json::from_str(json).unwrap();
        let lazy = catalog.find("Lazy`1").unwrap();
        assert_eq!(lazy.members[0].kind, MemberKind::Property);
        assert_eq!(lazy.members[0].accessibility, Accessibility::Public);
    }

    #[test]
    fn test_add_type_replaces_same_key() {
        let mut catalog = TypeCatalog::with_task_types();
        let before = catalog.types.len();
        catalog.merge(TypeCatalog {
            types: vec![TypeDecl::new("Task", &[])],
            extensions: Vec::new(),
        });
        assert_eq!(catalog.types.len(), before);
        assert!(catalog.declared_members(&TypeRef::named("Task"), "GetAwaiter").is_empty());
    }
}
