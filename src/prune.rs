//! 按校验器清理过滤 [`Part`] 序列

use crate::ast::{Operator, Part, Value};
use log::debug;
use serde::{Deserialize, Serialize};

/// 删除条件之后哪些分组需要移除
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PruneMode {
    /// 只移除没有子项的分组
    #[default]
    EmptyGroups,
    /// 同时展开只剩一个子项的分组，子项直接并入父分组
    EmptyOrSingletonGroups,
}

/// 清理过程中输出里尚未结束的分组
struct Frame {
    /// `OpenGroup` 标记在输出中的位置
    open_index: usize,
    children: usize,
}

/// 删除 `predicate` 拒绝的条件，再折叠因此变空的分组
/// （按 `mode` 也折叠只剩一个子项的分组）。
///
/// 输入必须括号配对，输出同样配对。
pub fn prune<F>(parts: &[Part], mut predicate: F, mode: PruneMode) -> Vec<Part>
where
    F: FnMut(&str, &Value, Operator) -> bool,
{
    let mut out: Vec<Part> = Vec::with_capacity(parts.len());
    let mut frames: Vec<Frame> = Vec::new();
    let mut dropped = 0usize;

    for part in parts {
        match part {
            Part::OpenGroup(_) => {
                frames.push(Frame {
                    open_index: out.len(),
                    children: 0,
                });
                out.push(part.clone());
            }
            Part::CloseGroup(_) => {
                let Some(frame) = frames.pop() else {
                    // 输入不配对，原样保留标记
                    out.push(part.clone());
                    continue;
                };

                let kept = match frame.children {
                    0 => {
                        out.truncate(frame.open_index);
                        false
                    }
                    1 if mode == PruneMode::EmptyOrSingletonGroups => {
                        out.remove(frame.open_index);
                        true
                    }
                    _ => {
                        out.push(part.clone());
                        true
                    }
                };

                if kept {
                    if let Some(parent) = frames.last_mut() {
                        parent.children += 1;
                    }
                }
            }
            Part::Leaf {
                field,
                value,
                operator,
            } => {
                if !predicate(field, value, *operator) {
                    dropped += 1;
                    continue;
                }
                out.push(part.clone());
                if let Some(parent) = frames.last_mut() {
                    parent.children += 1;
                }
            }
        }
    }

    debug!(
        "pruned {} leaf part(s) ({:?}): {} -> {} part(s)",
        dropped,
        mode,
        parts.len(),
        out.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Connector::{And, Or};
    use crate::ast::Operator::*;
    use crate::parser::parse_filters;

    fn reject(field: &'static str) -> impl FnMut(&str, &Value, Operator) -> bool {
        move |f, _, _| f != field
    }

    #[test]
    fn test_keep_everything() {
        let parts = parse_filters("a eq 'b' and (c eq 'd' or e gt 3)").unwrap();
        assert_eq!(prune(&parts, |_, _, _| true, PruneMode::EmptyGroups), parts);
    }

    #[test]
    fn test_emptied_group_is_removed() {
        let parts = parse_filters("a eq 'b' and (c eq 'd' or e gt 3)").unwrap();
        let pruned = prune(
            &parts,
            |f, _, _| f != "c" && f != "e",
            PruneMode::EmptyGroups,
        );
        assert_eq!(
            pruned,
            vec![
                Part::OpenGroup(And),
                Part::leaf("a", "b", Eq),
                Part::CloseGroup(And),
            ]
        );
    }

    #[test]
    fn test_group_with_survivor_is_kept() {
        let parts = parse_filters("a eq 'b' and (c eq 'd' or e gt 3)").unwrap();
        let pruned = prune(&parts, reject("e"), PruneMode::EmptyGroups);
        assert_eq!(
            pruned,
            vec![
                Part::OpenGroup(And),
                Part::leaf("a", "b", Eq),
                Part::OpenGroup(Or),
                Part::leaf("c", "d", Eq),
                Part::CloseGroup(Or),
                Part::CloseGroup(And),
            ]
        );
    }

    #[test]
    fn test_singleton_groups_unwrapped() {
        let parts = parse_filters("a eq 'b' and (c eq 'd' or e gt 3)").unwrap();
        let pruned = prune(&parts, reject("e"), PruneMode::EmptyOrSingletonGroups);
        assert_eq!(
            pruned,
            vec![
                Part::OpenGroup(And),
                Part::leaf("a", "b", Eq),
                Part::leaf("c", "d", Eq),
                Part::CloseGroup(And),
            ]
        );

        let pruned = prune(&parts, reject("a"), PruneMode::EmptyOrSingletonGroups);
        assert_eq!(
            pruned,
            vec![
                Part::OpenGroup(Or),
                Part::leaf("c", "d", Eq),
                Part::leaf("e", 3, Gt),
                Part::CloseGroup(Or),
            ]
        );
    }

    #[test]
    fn test_cascading_collapse() {
        let parts = parse_filters("a eq 1 or (b eq 2 and (c eq 3 or d eq 4))").unwrap();
        let pruned = prune(&parts, |f, _, _| f == "a", PruneMode::EmptyGroups);
        assert_eq!(
            pruned,
            vec![
                Part::OpenGroup(Or),
                Part::leaf("a", 1, Eq),
                Part::CloseGroup(Or),
            ]
        );
        assert_eq!(
            prune(&parts, |_, _, _| false, PruneMode::EmptyGroups),
            vec![]
        );
    }

    #[test]
    fn test_predicate_sees_value_and_operator() {
        let parts = parse_filters("id eq 1 and id eq 'x' and id gt 2").unwrap();
        let pruned = prune(
            &parts,
            |f, v, op| f == "id" && v.as_i64().is_some() && op == Eq,
            PruneMode::EmptyOrSingletonGroups,
        );
        assert_eq!(pruned, vec![Part::leaf("id", 1, Eq)]);
    }
}
