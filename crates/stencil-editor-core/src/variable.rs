//! Variable descriptors and the registry the editor looks them up in.
//!
//! The registry is owned by the host. The core only reads from it: labels
//! for rendering tokens, examples for previews.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A variable that can be placed into a template as `${name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDescriptor {
    /// Identifier used inside the placeholder.
    pub name: SmolStr,
    /// Human readable label shown on the token.
    pub label: SmolStr,
    /// Representative value used by the preview.
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub description: String,
}

impl VariableDescriptor {
    pub fn new(
        name: impl Into<SmolStr>,
        label: impl Into<SmolStr>,
        example: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            example: example.into(),
            description: description.into(),
        }
    }

    /// The placeholder text for this variable, e.g. `${orderNo}`.
    pub fn placeholder(&self) -> String {
        format!("${{{}}}", self.name)
    }
}

/// Ordered collection of variable descriptors, unique by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableRegistry {
    variables: Vec<VariableDescriptor>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock variables offered by a fresh template editor.
    pub fn defaults() -> Self {
        Self::from_iter([
            VariableDescriptor::new("userName", "用户姓名", "张三", "用户的真实姓名"),
            VariableDescriptor::new(
                "orderNo",
                "订单编号",
                "ORD202312250001",
                "系统生成的订单唯一编号",
            ),
            VariableDescriptor::new(
                "productName",
                "产品名称",
                "智能手机 Pro Max",
                "产品的完整名称",
            ),
            VariableDescriptor::new("date", "日期", "2023-12-25", "日期格式：YYYY-MM-DD"),
            VariableDescriptor::new(
                "amount",
                "金额",
                "1999.00",
                "金额（元），最多保留两位小数",
            ),
        ])
    }

    /// Insert a descriptor, replacing any existing one with the same name.
    ///
    /// Replacement keeps the original position so iteration order is stable.
    pub fn insert(&mut self, descriptor: VariableDescriptor) {
        match self.variables.iter_mut().find(|v| v.name == descriptor.name) {
            Some(existing) => *existing = descriptor,
            None => self.variables.push(descriptor),
        }
    }

    pub fn get(&self, name: &str) -> Option<&VariableDescriptor> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Label for `name`, falling back to the name itself for unknown variables.
    pub fn label_for<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name).map(|v| v.label.as_str()).unwrap_or(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableDescriptor> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl FromIterator<VariableDescriptor> for VariableRegistry {
    fn from_iter<I: IntoIterator<Item = VariableDescriptor>>(iter: I) -> Self {
        let mut registry = Self::new();
        for descriptor in iter {
            registry.insert(descriptor);
        }
        registry
    }
}

impl<'a> IntoIterator for &'a VariableRegistry {
    type Item = &'a VariableDescriptor;
    type IntoIter = std::slice::Iter<'a, VariableDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.variables.iter()
    }
}
