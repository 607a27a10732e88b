//! Action server parameters.
//!
//! Parameters come from a ROS2 parameter file:
//!
//! ```yaml
//! joint_trajectory_action:
//!   ros__parameters:
//!     constraints:
//!       goal_threshold: 0.01
//!     watchdog_period: 1.0
//!     topic_list:
//!       - name: r1
//!         ns: sda10f
//!         group: 0
//!         joints: [arm_left_joint_1_s, arm_left_joint_2_l]
//! ```
//!
//! Node keys may be wildcard patterns (`/**`, `/*/node`). Wildcard sections
//! are applied first, a section naming the node overrides them.

use crate::error::{Error, Result};
use dynjta_core::{GroupId, GroupRegistry, MotionGroup};
use std::{fs, path::Path, time::Duration};
use tracing::warn;
use yaml_rust2::{Yaml, YamlLoader, yaml::Hash};

/// Default absolute per-joint position tolerance.
pub const DEFAULT_GOAL_THRESHOLD: f64 = 0.01;

/// Default period of the feedback watchdog.
pub const WATCHDOG_PERIOD: Duration = Duration::from_secs(1);

/// Default node name used to look up parameters.
pub const DEFAULT_NODE_NAME: &str = "joint_trajectory_action";

const GOAL_THRESHOLD: &str = "constraints.goal_threshold";
const WATCHDOG: &str = "watchdog_period";
const TOPIC_LIST: &str = "topic_list";
const CONTROLLER_JOINT_NAMES: &str = "controller_joint_names";

/// One `topic_list` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupConfig {
    pub name: String,
    pub ns: String,
    pub group: GroupId,
    pub joints: Vec<String>,
}

impl From<&GroupConfig> for MotionGroup {
    fn from(config: &GroupConfig) -> Self {
        MotionGroup::new(config.group, &config.name, &config.ns, config.joints.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionConfig {
    pub goal_threshold: f64,
    pub watchdog_period: Duration,
    /// Multi-group configuration; `None` selects single-group mode.
    pub topic_list: Option<Vec<GroupConfig>>,
    /// Joints of the single-group fallback.
    pub controller_joint_names: Vec<String>,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            goal_threshold: DEFAULT_GOAL_THRESHOLD,
            watchdog_period: WATCHDOG_PERIOD,
            topic_list: None,
            controller_joint_names: Vec::new(),
        }
    }
}

impl ActionConfig {
    /// Loads the parameters of `node_name` from a parameter file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or is not valid YAML, if no
    /// section applies to the node, or if a parameter has a bad value.
    pub fn from_file<P: AsRef<Path>>(path: P, node_name: &str) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|_| Error::ParamFileNotFound(path.to_path_buf()))?;
        Self::from_yaml_str(&content, node_name)
            .map_err(|e| match e {
                Error::ParamParseError(msg) => {
                    Error::ParamParseError(format!("{}: {msg}", path.display()))
                }
                other => other,
            })
    }

    /// Loads the parameters of `node_name` from YAML text.
    pub fn from_yaml_str(content: &str, node_name: &str) -> Result<Self> {
        let docs =
            YamlLoader::load_from_str(content).map_err(|e| Error::ParamParseError(e.to_string()))?;
        let Some(doc) = docs.first() else {
            return Err(Error::InvalidParamFileStructure("empty parameter file".to_string()));
        };
        let params = node_parameters(doc, node_name)?;
        Self::from_params(&params)
    }

    fn from_params(params: &Hash) -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = goal_threshold(params) {
            config.goal_threshold = positive(GOAL_THRESHOLD, value)?;
        }

        if let Some(value) = get(params, WATCHDOG) {
            let secs = positive(WATCHDOG, value)?;
            let period = Duration::try_from_secs_f64(secs)
                .map_err(|e| Error::invalid(WATCHDOG, e.to_string()))?;
            if period.is_zero() {
                return Err(Error::invalid(WATCHDOG, format!("{secs} rounds to zero")));
            }
            config.watchdog_period = period;
        }

        if let Some(value) = get(params, TOPIC_LIST) {
            let entries = value
                .as_vec()
                .ok_or_else(|| Error::invalid(TOPIC_LIST, "expected a sequence"))?;
            let groups = entries
                .iter()
                .enumerate()
                .map(|(i, entry)| parse_group(i, entry))
                .collect::<Result<Vec<_>>>()?;
            config.topic_list = Some(groups);
        }

        if let Some(value) = get(params, CONTROLLER_JOINT_NAMES) {
            config.controller_joint_names = string_list(CONTROLLER_JOINT_NAMES, value)?
                .into_iter()
                .filter(|name| !name.is_empty())
                .collect();
        }

        Ok(config)
    }

    /// Builds the motion group registry.
    ///
    /// Uses `topic_list` when present. Otherwise falls back to a single
    /// group made of `controller_joint_names`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoGroupConfig`] when neither is configured, or the
    /// registry validation error.
    pub fn registry(&self) -> Result<GroupRegistry> {
        if let Some(groups) = &self.topic_list {
            return Ok(GroupRegistry::new(groups.iter().map(MotionGroup::from).collect())?);
        }
        if self.controller_joint_names.is_empty() {
            return Err(Error::NoGroupConfig);
        }
        warn!("No topic_list found, assuming single motion-group controller configuration");
        Ok(GroupRegistry::single(self.controller_joint_names.clone())?)
    }
}

/// Merges every `ros__parameters` section that applies to `node_name`.
fn node_parameters(doc: &Yaml, node_name: &str) -> Result<Hash> {
    let root = doc.as_hash().ok_or_else(|| {
        Error::InvalidParamFileStructure("Root element must be a mapping/hash".to_string())
    })?;

    let mut wildcard = Vec::new();
    let mut exact = Vec::new();
    for (node_key, node_value) in root {
        let pattern = node_key.as_str().ok_or_else(|| {
            Error::InvalidParamFileStructure("Node name must be a string".to_string())
        })?;
        if !match_wildcard_pattern(pattern, node_name) {
            continue;
        }
        let section = node_value
            .as_hash()
            .and_then(|node| node.get(&Yaml::String("ros__parameters".to_string())))
            .and_then(Yaml::as_hash)
            .ok_or_else(|| {
                Error::InvalidParamFileStructure(format!(
                    "Node '{pattern}' must have a 'ros__parameters' mapping"
                ))
            })?;
        if pattern.contains('*') {
            wildcard.push(section);
        } else {
            exact.push(section);
        }
    }

    if wildcard.is_empty() && exact.is_empty() {
        return Err(Error::InvalidParamFileStructure(format!(
            "No parameters for node '{node_name}'"
        )));
    }

    let mut params = Hash::new();
    for section in wildcard.into_iter().chain(exact) {
        for (key, value) in section {
            params.insert(key.clone(), value.clone());
        }
    }
    Ok(params)
}

/// Matches a node name against a parameter file node key.
///
/// `*` matches a single `/`-delimited token, `**` zero or more tokens.
pub fn match_wildcard_pattern(pattern: &str, node_name: &str) -> bool {
    let pattern_parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let name_parts: Vec<&str> = node_name.split('/').filter(|s| !s.is_empty()).collect();
    match_parts(&pattern_parts, &name_parts)
}

fn match_parts(pattern: &[&str], name: &[&str]) -> bool {
    match (pattern.first(), name.first()) {
        (None, None) => true,
        (None, Some(_)) => false,
        (Some(&"**"), _) => (0..=name.len()).any(|i| match_parts(&pattern[1..], &name[i..])),
        (Some(_), None) => false,
        (Some(&"*"), Some(_)) => match_parts(&pattern[1..], &name[1..]),
        (Some(literal), Some(token)) => literal == token && match_parts(&pattern[1..], &name[1..]),
    }
}

fn get<'a>(params: &'a Hash, key: &str) -> Option<&'a Yaml> {
    params.get(&Yaml::String(key.to_string()))
}

/// `constraints: {goal_threshold: x}`, `constraints.goal_threshold` or
/// the ROS1 style `constraints/goal_threshold`.
fn goal_threshold(params: &Hash) -> Option<&Yaml> {
    get(params, "constraints")
        .and_then(Yaml::as_hash)
        .and_then(|constraints| get(constraints, "goal_threshold"))
        .or_else(|| get(params, GOAL_THRESHOLD))
        .or_else(|| get(params, "constraints/goal_threshold"))
}

fn float(name: &str, value: &Yaml) -> Result<f64> {
    match value {
        Yaml::Real(_) => value
            .as_f64()
            .ok_or_else(|| Error::invalid(name, "not a number")),
        Yaml::Integer(i) => Ok(*i as f64),
        _ => Err(Error::invalid(name, "expected a number")),
    }
}

fn positive(name: &str, value: &Yaml) -> Result<f64> {
    let value = float(name, value)?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::invalid(name, format!("must be finite and positive, got {value}")))
    }
}

fn string_list(name: &str, value: &Yaml) -> Result<Vec<String>> {
    value
        .as_vec()
        .ok_or_else(|| Error::invalid(name, "expected a sequence of strings"))?
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| Error::invalid(name, "expected a sequence of strings"))
        })
        .collect()
}

fn parse_group(index: usize, entry: &Yaml) -> Result<GroupConfig> {
    let field = |key: &str| format!("{TOPIC_LIST}[{index}].{key}");
    let entry = entry
        .as_hash()
        .ok_or_else(|| Error::invalid(&field("*"), "expected a mapping"))?;

    let name = get(entry, "name")
        .and_then(Yaml::as_str)
        .ok_or_else(|| Error::invalid(&field("name"), "missing or not a string"))?
        .to_string();

    let ns = match get(entry, "ns") {
        None => String::new(),
        Some(ns) => ns
            .as_str()
            .ok_or_else(|| Error::invalid(&field("ns"), "not a string"))?
            .to_string(),
    };

    let group = get(entry, "group")
        .and_then(Yaml::as_i64)
        .ok_or_else(|| Error::invalid(&field("group"), "missing or not an integer"))?;
    let group = GroupId::try_from(group)
        .map_err(|_| Error::invalid(&field("group"), format!("{group} is out of range")))?;

    let joints = match get(entry, "joints") {
        Some(joints) => string_list(&field("joints"), joints)?,
        None => return Err(Error::invalid(&field("joints"), "missing")),
    };

    Ok(GroupConfig {
        name,
        ns,
        group,
        joints,
    })
}
