use crate::binding::DEFAULT_BRANCH;
use crate::binding::SourceControlConfig;
use crate::binding::SourceControlState;

/// Declaration of one configurable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: &'static str,
    pub required: bool,
    /// Changing the field requires destroying and recreating the binding.
    pub force_new: bool,
    pub default: Option<&'static str>,
}

pub const SOURCE_CONTROL_SCHEMA: &[FieldSchema] = &[
    FieldSchema {
        name: "resource_group_name",
        required: true,
        force_new: true,
        default: None,
    },
    FieldSchema {
        name: "app_service_name",
        required: true,
        force_new: true,
        default: None,
    },
    FieldSchema {
        name: "repo_url",
        required: true,
        force_new: false,
        default: None,
    },
    FieldSchema {
        name: "branch",
        required: false,
        force_new: false,
        default: Some(DEFAULT_BRANCH),
    },
];

/// What applying a configuration to existing state requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    NoChange,
    /// Fields that changed; none of them force a new binding.
    Update(Vec<&'static str>),
    /// Fields that changed, at least one of which forces a new binding.
    Replace(Vec<&'static str>),
}

pub fn diff(state: &SourceControlState, config: &SourceControlConfig) -> Change {
    let changed: Vec<&FieldSchema> = SOURCE_CONTROL_SCHEMA
        .iter()
        .filter(|field| state.field(field.name) != config.field(field.name))
        .collect();

    let names = changed.iter().map(|field| field.name).collect();
    if changed.is_empty() {
        Change::NoChange
    } else if changed.iter().any(|field| field.force_new) {
        Change::Replace(names)
    } else {
        Change::Update(names)
    }
}
