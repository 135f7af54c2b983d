//! Lifecycle Guard - Disables the built-in per-module publish steps
//!
//! The host would otherwise install/deploy every module as soon as its own
//! lifecycle reaches that phase. The guard removes those goals from the
//! plugin executions so the deferred pass at session end is the only one.
//! This is the one place where the host's build graph is mutated, and it
//! runs once at session start before any module builds.

use crate::build::{BuildUnit, PluginKey};
use tracing::{debug, warn};

/// Stateless rewrite of plugin executions
pub struct LifecycleGuard;

impl LifecycleGuard {
    /// Check whether any unit still wires `goal` into an execution of `owner`
    pub fn contains_step_goal(projects: &[BuildUnit], owner: &PluginKey, goal: &str) -> bool {
        projects
            .iter()
            .flat_map(|unit| unit.plugins.iter())
            .filter(|plugin| &plugin.key == owner)
            .flat_map(|plugin| plugin.executions.iter())
            .any(|execution| execution.goals.iter().any(|g| g == goal))
    }

    /// Remove `goal` from every execution of `owner` across the build graph
    ///
    /// Only plugins whose full key (group id and artifact id) matches are
    /// touched; other goals of the same execution are kept. Returns the
    /// number of build units that changed, so a second call returns zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use deferred_deployer::build::{BuildPlugin, BuildUnit, PluginExecution, PluginKey};
    /// use deferred_deployer::lifecycle::LifecycleGuard;
    ///
    /// let mut unit = BuildUnit::new("com.example", "core", "1.0", "jar", "pom.xml");
    /// unit.plugins.push(BuildPlugin {
    ///     key: PluginKey::deploy_plugin(),
    ///     executions: vec![PluginExecution {
    ///         id: "default-deploy".to_string(),
    ///         goals: vec!["deploy".to_string()],
    ///     }],
    /// });
    /// let mut projects = vec![unit];
    ///
    /// let owner = PluginKey::deploy_plugin();
    /// assert_eq!(LifecycleGuard::suppress_default_step(&mut projects, &owner, "deploy"), 1);
    /// assert_eq!(LifecycleGuard::suppress_default_step(&mut projects, &owner, "deploy"), 0);
    /// ```
    pub fn suppress_default_step(
        projects: &mut [BuildUnit],
        owner: &PluginKey,
        goal: &str,
    ) -> usize {
        let mut reported = false;
        let mut modified_units = 0;

        for unit in projects.iter_mut() {
            let mut unit_modified = false;

            for plugin in unit.plugins.iter_mut() {
                debug!("Plugin: {}", plugin.key);
                for execution in &plugin.executions {
                    debug!("  -> {:?}", execution.goals);
                }

                if &plugin.key != owner {
                    continue;
                }

                for execution in plugin.executions.iter_mut() {
                    if execution.remove_goal(goal) {
                        unit_modified = true;
                    }
                }
            }

            if unit_modified {
                if !reported {
                    warn!("{}:{} has been deactivated.", owner, goal);
                    reported = true;
                }
                modified_units += 1;
            }
        }

        modified_units
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{BuildPlugin, PluginExecution};

    fn execution(id: &str, goals: &[&str]) -> PluginExecution {
        PluginExecution {
            id: id.to_string(),
            goals: goals.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn unit_with(artifact_id: &str, plugins: Vec<BuildPlugin>) -> BuildUnit {
        let mut unit = BuildUnit::new("com.example", artifact_id, "1.0", "jar", "pom.xml");
        unit.plugins = plugins;
        unit
    }

    fn deploy_plugin(goals: &[&str]) -> BuildPlugin {
        BuildPlugin {
            key: PluginKey::deploy_plugin(),
            executions: vec![execution("default-deploy", goals)],
        }
    }

    #[test]
    fn test_suppress_removes_goal_from_every_unit() {
        let mut projects = vec![
            unit_with("a", vec![deploy_plugin(&["deploy"])]),
            unit_with("b", vec![deploy_plugin(&["deploy"])]),
            unit_with("c", Vec::new()),
        ];
        let owner = PluginKey::deploy_plugin();

        assert!(LifecycleGuard::contains_step_goal(&projects, &owner, "deploy"));
        assert_eq!(
            LifecycleGuard::suppress_default_step(&mut projects, &owner, "deploy"),
            2
        );
        assert!(!LifecycleGuard::contains_step_goal(&projects, &owner, "deploy"));
    }

    #[test]
    fn test_suppress_is_idempotent() {
        let mut projects = vec![unit_with("a", vec![deploy_plugin(&["deploy"])])];
        let owner = PluginKey::deploy_plugin();

        assert_eq!(
            LifecycleGuard::suppress_default_step(&mut projects, &owner, "deploy"),
            1
        );
        let after_first = projects.clone();

        assert_eq!(
            LifecycleGuard::suppress_default_step(&mut projects, &owner, "deploy"),
            0
        );
        assert_eq!(projects, after_first);
    }

    #[test]
    fn test_other_goals_are_kept() {
        let mut projects = vec![unit_with("a", vec![deploy_plugin(&["help", "deploy"])])];
        let owner = PluginKey::deploy_plugin();

        LifecycleGuard::suppress_default_step(&mut projects, &owner, "deploy");

        assert_eq!(projects[0].plugins[0].executions[0].goals, vec!["help"]);
    }

    #[test]
    fn test_foreign_plugin_with_same_name_is_untouched() {
        let custom = BuildPlugin {
            key: PluginKey::new("com.acme.build", "maven-deploy-plugin"),
            executions: vec![execution("custom", &["deploy"])],
        };
        let mut projects = vec![unit_with("a", vec![custom.clone()])];

        let modified = LifecycleGuard::suppress_default_step(
            &mut projects,
            &PluginKey::deploy_plugin(),
            "deploy",
        );

        assert_eq!(modified, 0);
        assert_eq!(projects[0].plugins[0], custom);
    }

    #[test]
    fn test_install_and_deploy_are_independent() {
        let install = BuildPlugin {
            key: PluginKey::install_plugin(),
            executions: vec![execution("default-install", &["install"])],
        };
        let mut projects = vec![unit_with("a", vec![install, deploy_plugin(&["deploy"])])];

        LifecycleGuard::suppress_default_step(&mut projects, &PluginKey::deploy_plugin(), "deploy");

        assert!(LifecycleGuard::contains_step_goal(
            &projects,
            &PluginKey::install_plugin(),
            "install"
        ));
    }
}
