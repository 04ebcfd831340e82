//! Library catalog
//!
//! Declarations of referenced library types the semantic model cannot see
//! in source. The default catalog carries the identity-model helpers and
//! the LINQ and `System.String` methods that commonly share their names.
//! Extra types can be declared in configuration.

use serde::{Deserialize, Serialize};

/// A method exposed by a library type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibraryMethod {
    pub name: String,

    /// Parameter types in declaration order, the `this` parameter included
    #[serde(default)]
    pub parameters: Vec<String>,

    /// Declared with a `this` first parameter
    #[serde(default)]
    pub extension: bool,

    /// Instance method rather than static
    #[serde(default)]
    pub instance: bool,

    /// Generic parameters, e.g. `["T"]`
    #[serde(default)]
    pub type_params: Vec<String>,
}

impl LibraryMethod {
    /// A generic extension method over `parameters[0]`
    pub fn extension(name: &str, parameters: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            extension: true,
            instance: false,
            type_params: generic_names(parameters),
        }
    }

    /// Declared generic parameters, or those implied by `parameters` when
    /// none are declared
    pub fn generic_params(&self) -> Vec<String> {
        if !self.type_params.is_empty() {
            return self.type_params.clone();
        }
        let parameters: Vec<&str> = self.parameters.iter().map(String::as_str).collect();
        generic_names(&parameters)
    }

    /// A static, non-extension method
    pub fn static_method(name: &str, parameters: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            extension: false,
            instance: false,
            type_params: generic_names(parameters),
        }
    }
}

/// A type exposed by a referenced library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibraryType {
    pub namespace: String,
    pub name: String,

    /// C# keyword that aliases the type, e.g. `string`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,

    #[serde(default)]
    pub methods: Vec<LibraryMethod>,
}

impl LibraryType {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            keyword: None,
            methods: Vec::new(),
        }
    }

    pub fn with_keyword(mut self, keyword: &str) -> Self {
        self.keyword = Some(keyword.to_string());
        self
    }

    pub fn with_method(mut self, method: LibraryMethod) -> Self {
        self.methods.push(method);
        self
    }

    /// Namespace-qualified name, e.g. `System.Linq.Enumerable`
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

/// Set of known library types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryCatalog {
    types: Vec<LibraryType>,
}

impl LibraryCatalog {
    /// Catalog with no types
    pub fn empty() -> Self {
        Self { types: Vec::new() }
    }

    /// Add a type, merging methods into an existing type of the same name
    pub fn add_type(&mut self, ty: LibraryType) {
        let full_name = ty.full_name();
        match self.types.iter_mut().find(|t| t.full_name() == full_name) {
            Some(existing) => {
                if existing.keyword.is_none() {
                    existing.keyword = ty.keyword;
                }
                for method in ty.methods {
                    if !existing.methods.contains(&method) {
                        existing.methods.push(method);
                    }
                }
            }
            None => self.types.push(ty),
        }
    }

    pub fn with_type(mut self, ty: LibraryType) -> Self {
        self.add_type(ty);
        self
    }

    pub fn types(&self) -> &[LibraryType] {
        &self.types
    }

    pub fn find(&self, full_name: &str) -> Option<&LibraryType> {
        self.types.iter().find(|t| t.full_name() == full_name)
    }

    /// Type a keyword such as `string` stands for
    pub fn keyword_type(&self, keyword: &str) -> Option<&LibraryType> {
        self.types
            .iter()
            .find(|t| t.keyword.as_deref() == Some(keyword))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for LibraryCatalog {
    fn default() -> Self {
        let sequence = ["IEnumerable<T>"];
        let predicate = ["IEnumerable<T>", "Func<T, bool>"];

        let enumerable = ["Any", "Count", "First", "FirstOrDefault"]
            .into_iter()
            .fold(LibraryType::new("System.Linq", "Enumerable"), |ty, name| {
                ty.with_method(LibraryMethod::extension(name, &sequence))
                    .with_method(LibraryMethod::extension(name, &predicate))
            })
            .with_method(LibraryMethod::extension("Where", &predicate))
            .with_method(LibraryMethod::extension(
                "Select",
                &["IEnumerable<TSource>", "Func<TSource, TResult>"],
            ));

        Self::empty()
            .with_type(
                LibraryType::new("Microsoft.IdentityModel.Tokens", "CollectionUtilities")
                    .with_method(LibraryMethod::extension("IsNullOrEmpty", &sequence)),
            )
            .with_type(enumerable)
            .with_type(
                LibraryType::new("System", "String")
                    .with_keyword("string")
                    .with_method(LibraryMethod::static_method("IsNullOrEmpty", &["string"]))
                    .with_method(LibraryMethod::static_method(
                        "IsNullOrWhiteSpace",
                        &["string"],
                    )),
            )
            .with_type(LibraryType::new("System", "Object").with_keyword("object"))
    }
}

/// Generic parameter names used in `parameters`, by the `T`/`TName`
/// convention
fn generic_names(parameters: &[&str]) -> Vec<String> {
    let mut names = Vec::new();
    for parameter in parameters {
        for word in parameter.split(|c: char| !c.is_alphanumeric() && c != '_') {
            let mut chars = word.chars();
            let is_generic = chars.next() == Some('T')
                && chars.next().is_none_or(|c| c.is_ascii_uppercase());
            if is_generic && !names.iter().any(|n| n == word) {
                names.push(word.to_string());
            }
        }
    }
    names
}
