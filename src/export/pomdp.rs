use std::path::Path;

use crate::error::Result;
use crate::model::DecPomdpModel;

/// Writes a Dec-POMDP as the equivalent single-agent POMDP over joint actions
/// and joint observations, in Cassandra's `.POMDP` text format.
pub struct PomdpExporter;

impl PomdpExporter {
    /// Render the model. Only non-zero transition and observation entries
    /// are listed.
    pub fn to_pomdp_string<M: DecPomdpModel + ?Sized>(model: &M) -> String {
        let nr_s = model.nr_states();
        let nr_ja = model.nr_joint_actions();
        let nr_jo = model.nr_joint_observations();
        let mut lines: Vec<String> = Vec::new();

        lines.push(format!("# flattened Dec-POMDP with {} agents", model.nr_agents()));
        lines.push(format!("# actions per agent: {:?}", model.nr_actions()));
        lines.push(format!("# observations per agent: {:?}", model.nr_observations()));
        lines.push(format!("discount: {}", model.discount()));
        lines.push("values: reward".to_string());
        lines.push(format!("states: {}", nr_s));
        lines.push(format!("actions: {}", nr_ja));
        lines.push(format!("observations: {}", nr_jo));
        let start: Vec<String> = (0..nr_s)
            .map(|s| model.initial_state_probability(s).to_string())
            .collect();
        lines.push(format!("start: {}", start.join(" ")));
        lines.push(String::new());

        for ja in 0..nr_ja {
            lines.push(format!("# joint action {} = {:?}", ja, model.joint_to_individual_actions(ja)));
            for s in 0..nr_s {
                for s_next in 0..nr_s {
                    let p = model.transition_probability(s, ja, s_next);
                    if p != 0.0 {
                        lines.push(format!("T: {} : {} : {} {}", ja, s, s_next, p));
                    }
                }
            }
            for s_next in 0..nr_s {
                for jo in 0..nr_jo {
                    let p = model.observation_probability(ja, s_next, jo);
                    if p != 0.0 {
                        lines.push(format!("O: {} : {} : {} {}", ja, s_next, jo, p));
                    }
                }
            }
            for s in 0..nr_s {
                lines.push(format!("R: {} : {} : * : * {}", ja, s, model.reward(s, ja)));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }

    /// Write the model to `path`
    pub fn export<M: DecPomdpModel + ?Sized, P: AsRef<Path>>(model: &M, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), Self::to_pomdp_string(model))?;
        log::debug!("exported POMDP to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::problems;

    #[test]
    fn test_header_and_entries() {
        let model = problems::dec_tiger().unwrap();
        let text = PomdpExporter::to_pomdp_string(&model);
        assert!(text.contains("discount: 0.95\n"));
        assert!(text.contains("states: 2\n"));
        assert!(text.contains("actions: 9\n"));
        assert!(text.contains("observations: 4\n"));
        assert!(text.contains("start: 0.5 0.5\n"));
        // listen-listen keeps the tiger where it is
        assert!(text.contains("T: 0 : 0 : 0 1\n"));
        assert!(!text.contains("T: 0 : 0 : 1 "));
        assert_eq!(text.lines().filter(|l| l.starts_with("R:")).count(), 18);
        assert!(text.ends_with("\n") && !text.ends_with("\n\n"));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state_matching.POMDP");
        let model = problems::state_matching(0.9).unwrap();
        PomdpExporter::export(&model, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("values: reward"));
    }
}
