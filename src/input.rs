//! JSON input for declaration sets.
//!
//! A file is a JSON array (or an object with a `declarations` array) whose
//! elements are either native records:
//!
//! ```json
//! {"name": "com.example.Circle", "kind": "class", "superclass": "Shape",
//!  "interfaces": ["Drawable"], "methods": [{"name": "area", "params": [], "abstract": false}]}
//! ```
//!
//! or records emitted by the source extractor, which carry method names only:
//!
//! ```json
//! {"Classname": "Printable", "Methods": ["print"], "Loc": 4, "Type": "interface",
//!  "Extends": null, "Implements": ["Displayable"]}
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::declaration::Declaration;
use crate::error::ResolveError;
use crate::logging::Stage;
use crate::types::{MethodDecl, TypeKind};

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid declaration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Declaration(#[from] ResolveError),
}

pub type InputResult<T> = Result<T, InputError>;

/// Native declaration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationRecord {
    pub name: String,
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enclosing_type: Option<String>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    #[serde(default, rename = "final")]
    pub is_final: bool,
}

impl TryFrom<DeclarationRecord> for Declaration {
    type Error = ResolveError;

    fn try_from(record: DeclarationRecord) -> Result<Self, Self::Error> {
        let mut builder = Declaration::builder(record.name, record.kind).methods(record.methods);
        if let Some(superclass) = record.superclass {
            builder = builder.extends(superclass);
        }
        for interface in record.interfaces {
            builder = builder.implements(interface);
        }
        if let Some(outer) = record.enclosing_type {
            builder = builder.enclosed_by(outer);
        }
        if record.is_final {
            builder = builder.mark_final();
        }
        builder.build()
    }
}

/// Record shape produced by the source extractor.
///
/// `Type` is one of `public`, `abstract`, `final`, `private`, `protected`,
/// `interface` or `default`. Interface methods are taken as abstract and
/// class methods as concrete; parameter types are not available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClassInfo {
    pub classname: String,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub loc: u32,
    #[serde(rename = "Type", default = "default_type")]
    pub type_name: String,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
}

fn default_type() -> String {
    "default".to_string()
}

impl ClassInfo {
    pub fn kind(&self) -> TypeKind {
        match self.type_name.as_str() {
            "interface" => TypeKind::Interface,
            "abstract" => TypeKind::AbstractClass,
            _ => TypeKind::Class,
        }
    }
}

impl TryFrom<ClassInfo> for Declaration {
    type Error = ResolveError;

    fn try_from(info: ClassInfo) -> Result<Self, Self::Error> {
        let kind = info.kind();
        let methods = info.methods.iter().map(|name| MethodDecl {
            signature: crate::types::MethodSignature::nullary(name.as_str()),
            is_abstract: kind.is_interface(),
        });

        let mut builder = Declaration::builder(info.classname.as_str(), kind).methods(methods);
        if kind.is_interface() {
            // Extractor reports an interface's extends-list under Implements
            if let Some(extra) = &info.extends {
                builder = builder.implements(extra.as_str());
            }
        } else if let Some(superclass) = &info.extends {
            builder = builder.extends(superclass.as_str());
        }
        for interface in &info.implements {
            builder = builder.implements(interface.as_str());
        }
        if info.type_name == "final" {
            builder = builder.mark_final();
        }
        builder.build()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InputRecord {
    Native(DeclarationRecord),
    Extracted(ClassInfo),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InputDocument {
    List(Vec<InputRecord>),
    Wrapped { declarations: Vec<InputRecord> },
}

/// Decode a declaration set from JSON text.
pub fn from_json_str(json: &str) -> InputResult<Vec<Declaration>> {
    let document: InputDocument = serde_json::from_str(json)?;
    let records = match document {
        InputDocument::List(records) | InputDocument::Wrapped { declarations: records } => records,
    };

    records
        .into_iter()
        .map(|record| {
            let decl = match record {
                InputRecord::Native(record) => Declaration::try_from(record)?,
                InputRecord::Extracted(info) => Declaration::try_from(info)?,
            };
            Ok(decl)
        })
        .collect()
}

/// Read and decode a declaration file.
pub fn load_file(path: &Path) -> InputResult<Vec<Declaration>> {
    let json = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let declarations = from_json_str(&json)?;
    crate::debug_event!(
        Stage::Input,
        "loaded",
        "{} declarations from {}",
        declarations.len(),
        path.display()
    );
    Ok(declarations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MethodSignature;

    #[test]
    fn test_native_records() {
        let json = r#"[
            {"name": "com.example.Shape", "kind": "abstract_class",
             "methods": [{"name": "area", "abstract": true}]},
            {"name": "com.example.Circle", "kind": "class", "superclass": "Shape",
             "interfaces": ["Serializable"], "final": true,
             "methods": [{"name": "area", "params": []}]}
        ]"#;

        let decls = from_json_str(json).unwrap();
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].kind(), TypeKind::AbstractClass);
        assert_eq!(
            decls[0].declares(&MethodSignature::nullary("area")),
            Some(true)
        );
        assert_eq!(decls[1].superclass(), Some("Shape"));
        assert_eq!(decls[1].interfaces(), &["Serializable"]);
        assert!(decls[1].is_final());
    }

    #[test]
    fn test_wrapped_document() {
        let json = r#"{"declarations": [{"name": "A", "kind": "interface"}]}"#;
        let decls = from_json_str(json).unwrap();
        assert_eq!(decls[0].kind(), TypeKind::Interface);
    }

    #[test]
    fn test_extractor_records() {
        let json = r#"[
            {"Classname": "AbstractService", "Methods": ["start", "initialize", "stop", "cleanup"],
             "Loc": 18, "Type": "abstract", "Extends": "BaseService",
             "Implements": ["Serializable", "Loggable"]},
            {"Classname": "Printable", "Methods": ["print", "format"], "Loc": 5,
             "Type": "interface", "Extends": null, "Implements": ["Displayable", "Formattable"]},
            {"Classname": "UtilityClass", "Methods": ["helperMethod"], "Loc": 3,
             "Type": "final", "Extends": null, "Implements": []}
        ]"#;

        let decls = from_json_str(json).unwrap();

        let service = &decls[0];
        assert_eq!(service.kind(), TypeKind::AbstractClass);
        assert_eq!(service.superclass(), Some("BaseService"));
        assert_eq!(service.interfaces(), &["Serializable", "Loggable"]);
        // No abstractness information for class methods
        assert_eq!(service.abstract_methods().count(), 0);

        let printable = &decls[1];
        assert_eq!(printable.kind(), TypeKind::Interface);
        assert_eq!(printable.superclass(), None);
        assert_eq!(printable.interfaces(), &["Displayable", "Formattable"]);
        assert_eq!(printable.abstract_methods().count(), 2);

        let util = &decls[2];
        assert_eq!(util.kind(), TypeKind::Class);
        assert!(util.is_final());
        assert_eq!(util.superclass(), None);
    }

    #[test]
    fn test_malformed_record_is_reported() {
        let json = r#"[{"name": "", "kind": "class"}]"#;
        let err = from_json_str(json).unwrap_err();
        assert!(matches!(
            err,
            InputError::Declaration(ResolveError::MalformedDeclaration { .. })
        ));
    }

    #[test]
    fn test_invalid_json() {
        let err = from_json_str("{not json").unwrap_err();
        assert!(matches!(err, InputError::Json(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, InputError::Io { .. }));
    }
}
