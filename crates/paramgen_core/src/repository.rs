//! Scenario- and tag-indexed parameter store.
//!
//! Parameters live in an arena owned by the repository. A row declaring
//! scenarios `"A, B"` is stored once and both scenario keys point at the same
//! [`ParameterId`], so the two scenarios share one cache.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use crate::DEFAULT_SCENARIO;
use crate::error::{ConfigError, LookupError};
use crate::loader::load_parameters;
use crate::model::{ParameterDefinition, ParameterId, SchemaVersion};
use crate::parameter::Parameter;

/// Scenario name -> parameter, for one parameter name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterScenarioSet {
    scenarios: BTreeMap<String, ParameterId>,
}

impl ParameterScenarioSet {
    #[must_use]
    pub fn get(&self, scenario: &str) -> Option<ParameterId> {
        self.scenarios.get(scenario).copied()
    }

    #[must_use]
    pub fn contains(&self, scenario: &str) -> bool {
        self.scenarios.contains_key(scenario)
    }

    #[must_use]
    pub fn default_scenario(&self) -> Option<ParameterId> {
        self.get(DEFAULT_SCENARIO)
    }

    pub fn scenario_names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    fn insert(&mut self, scenario: String, id: ParameterId) {
        self.scenarios.insert(scenario, id);
    }

    /// Ids that would lose their last scenario key if `scenarios` were overwritten
    fn orphaned_by(&self, scenarios: &[String]) -> Vec<ParameterId> {
        let replaced: BTreeSet<ParameterId> =
            scenarios.iter().filter_map(|s| self.get(s)).collect();
        replaced
            .into_iter()
            .filter(|old| {
                !self
                    .scenarios
                    .iter()
                    .any(|(s, id)| id == old && !scenarios.contains(s))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParameterRepository {
    parameters: Vec<Parameter>,
    sets: FxHashMap<String, ParameterScenarioSet>,
    /// tag -> parameter name -> parameters carrying the tag
    tags: FxHashMap<String, BTreeMap<String, BTreeSet<ParameterId>>>,
    /// Arena slots no scenario points at any more
    free: Vec<ParameterId>,
}

impl ParameterRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a parameter under each scenario its definition declares.
    ///
    /// Registering a non-default scenario first back-fills metadata from the
    /// default scenario of the same name. A scenario already present for the
    /// name is replaced; a parameter left with no scenario gives up its
    /// arena slot to the next registration.
    pub fn register(&mut self, mut parameter: Parameter) -> ParameterId {
        let scenarios = parameter.definition().scenario_names();
        if scenarios.iter().any(|s| s != DEFAULT_SCENARIO) {
            self.fill_missing_from_default(parameter.definition_mut());
        }

        let name = parameter.name().to_string();
        let tags = parameter.definition().tag_names();

        let orphaned = self
            .sets
            .get(&name)
            .map(|set| set.orphaned_by(&scenarios))
            .unwrap_or_default();
        if !orphaned.is_empty() {
            self.untag(&name, &orphaned);
            self.free.extend(orphaned);
        }

        let id = match self.free.pop() {
            Some(id) => {
                self.parameters[id.0 as usize] = parameter;
                id
            }
            None => {
                let id = ParameterId(self.parameters.len() as u32);
                self.parameters.push(parameter);
                id
            }
        };

        let set = self.sets.entry(name.clone()).or_default();
        for scenario in scenarios {
            set.insert(scenario, id);
        }

        for tag in tags {
            self.tags
                .entry(tag)
                .or_default()
                .entry(name.clone())
                .or_default()
                .insert(id);
        }
        id
    }

    /// Drop replaced parameters of `name` from the tag index
    fn untag(&mut self, name: &str, ids: &[ParameterId]) {
        self.tags.retain(|_, by_name| {
            if let Some(set) = by_name.get_mut(name) {
                set.retain(|id| !ids.contains(id));
                if set.is_empty() {
                    by_name.remove(name);
                }
            }
            !by_name.is_empty()
        });
    }

    pub fn register_all(&mut self, parameters: impl IntoIterator<Item = Parameter>) {
        for p in parameters {
            self.register(p);
        }
    }

    /// Normalize definition rows and register every resulting parameter.
    pub fn load_rows(
        &mut self,
        rows: &[Map<String, Value>],
        version: SchemaVersion,
    ) -> Result<(), ConfigError> {
        let parameters = load_parameters(rows, version)?;
        self.register_all(parameters);
        Ok(())
    }

    fn fill_missing_from_default(&self, definition: &mut ParameterDefinition) {
        let name = definition.name.clone();
        let Some(default) = self
            .sets
            .get(&name)
            .and_then(ParameterScenarioSet::default_scenario)
            .map(|id| self.parameter(id).definition())
        else {
            tracing::warn!("No default value for param {name} found.");
            return;
        };

        let scenarios = definition.source_scenarios_string.clone().unwrap_or_default();
        if default.tags != definition.tags {
            tracing::warn!(
                "For param {name} for scenarios {scenarios}, tags is different from default parameter tags. Overwriting with default values."
            );
            definition.tags = default.tags.clone();
        }

        let fields: [(&str, &mut Option<String>, &Option<String>); 4] = [
            ("unit", &mut definition.unit, &default.unit),
            ("label", &mut definition.label, &default.label),
            ("comment", &mut definition.comment, &default.comment),
            ("source", &mut definition.source, &default.source),
        ];
        for (field, value, inherited) in fields {
            if value.as_deref().is_none_or(|v| v.trim().is_empty()) && inherited.is_some() {
                tracing::debug!(
                    "For param {name} for scenarios {scenarios}, populating attribute {field} with value {inherited:?} from default parameter."
                );
                value.clone_from(inherited);
            }
        }
    }

    /// Parameter by arena id. Panics if the id did not come from this repository.
    #[must_use]
    pub fn parameter(&self, id: ParameterId) -> &Parameter {
        &self.parameters[id.0 as usize]
    }

    #[cfg(test)]
    pub(crate) fn arena_len(&self) -> usize {
        self.parameters.len()
    }

    fn resolve(&self, name: &str, scenario: &str) -> Result<ParameterId, LookupError> {
        let set = self
            .sets
            .get(name)
            .ok_or_else(|| LookupError::ParameterNotFound(name.to_string()))?;
        set.get(scenario)
            .or_else(|| set.default_scenario())
            .ok_or_else(|| LookupError::ParameterNotFound(name.to_string()))
    }

    /// Parameter `name` under `scenario`, falling back to the default scenario.
    pub fn get(&self, name: &str, scenario: &str) -> Result<&Parameter, LookupError> {
        let id = self.resolve(name, scenario)?;
        Ok(self.parameter(id))
    }

    /// Mutable access, e.g. for recording usages. Same fallback as [`Self::get`].
    pub fn get_mut(&mut self, name: &str, scenario: &str) -> Result<&mut Parameter, LookupError> {
        let id = self.resolve(name, scenario)?;
        Ok(&mut self.parameters[id.0 as usize])
    }

    /// Parameters carrying `tag`, grouped by name. Empty for an unknown tag.
    #[must_use]
    pub fn find_by_tag(&self, tag: &str) -> BTreeMap<&str, Vec<&Parameter>> {
        self.tags
            .get(tag)
            .map(|by_name| {
                by_name
                    .iter()
                    .map(|(name, ids)| {
                        (
                            name.as_str(),
                            ids.iter().map(|id| self.parameter(*id)).collect(),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether `name` is registered under `scenario` (the default scenario when `None`)
    #[must_use]
    pub fn exists(&self, name: &str, scenario: Option<&str>) -> bool {
        self.sets
            .get(name)
            .is_some_and(|set| set.contains(scenario.unwrap_or(DEFAULT_SCENARIO)))
    }

    /// Scenario names registered for `name`, empty when unknown
    #[must_use]
    pub fn list_scenarios(&self, name: &str) -> Vec<&str> {
        self.sets
            .get(name)
            .map(|set| set.scenario_names().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn scenario_set(&self, name: &str) -> Option<&ParameterScenarioSet> {
        self.sets.get(name)
    }

    /// Drop every cached draw so the next invocation samples again.
    pub fn reset_caches(&mut self) {
        for p in &mut self.parameters {
            p.clear_cache();
        }
    }

    /// Registered parameter names in sorted order
    #[must_use]
    pub fn parameter_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of distinct parameter names
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
