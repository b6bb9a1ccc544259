use std::collections::HashMap;

use crate::error::FactoryError;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Orders `nodes` so that every node comes after the nodes it depends on.
///
/// `deps[i]` lists the indices node `i` refers to. The walk is an explicit
/// stack depth-first search, so deep graphs cannot overflow the call stack.
///
/// # Errors
///
/// Returns [`FactoryError::CyclicReference`] with the names along the first
/// cycle found, the repeated name closing the list.
pub(crate) fn dependency_order(names: &[&str], deps: &[Vec<usize>]) -> Result<Vec<usize>, FactoryError> {
    let n = names.len();
    let mut marks = vec![Mark::Unvisited; n];
    let mut order = Vec::with_capacity(n);
    // (node, index of the next dependency to visit)
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..n {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        marks[root] = Mark::InProgress;
        stack.push((root, 0));
        while let Some(top) = stack.last_mut() {
            let (node, next) = *top;
            if let Some(&dep) = deps[node].get(next) {
                top.1 += 1;
                match marks[dep] {
                    Mark::Done => {}
                    Mark::InProgress => {
                        let start = stack.iter().position(|(s, _)| *s == dep).unwrap_or(0);
                        let mut cycle: Vec<String> =
                            stack[start..].iter().map(|(s, _)| names[*s].to_string()).collect();
                        cycle.push(names[dep].to_string());
                        return Err(FactoryError::CyclicReference { cycle });
                    }
                    Mark::Unvisited => {
                        marks[dep] = Mark::InProgress;
                        stack.push((dep, 0));
                    }
                }
            } else {
                marks[node] = Mark::Done;
                order.push(node);
                stack.pop();
            }
        }
    }
    Ok(order)
}

/// Index of every name, for building dependency lists.
pub(crate) fn index_of<'a>(names: &[&'a str]) -> HashMap<&'a str, usize> {
    names.iter().enumerate().map(|(i, n)| (*n, i)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn dependencies_come_first() {
        let names = ["u0", "b0", "s0"];
        let deps = vec![vec![1, 2], vec![], vec![1]];
        let order = dependency_order(&names, &deps).unwrap();
        let pos = |i: usize| order.iter().position(|&x| x == i).unwrap();
        assert!(pos(1) < pos(2));
        assert!(pos(2) < pos(0));
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn reports_the_cycle() {
        let names = ["a", "b", "c"];
        let deps = vec![vec![1], vec![2], vec![0]];
        let err = dependency_order(&names, &deps).unwrap_err();
        let FactoryError::CyclicReference { cycle } = err else {
            panic!("expected a cycle");
        };
        assert_eq!(cycle, vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let err = dependency_order(&["a"], &[vec![0]]).unwrap_err();
        assert!(matches!(err, FactoryError::CyclicReference { ref cycle } if cycle.len() == 2));
    }

    #[test]
    fn long_chains_do_not_recurse() {
        let n = 100_000;
        let names: Vec<String> = (0..n).map(|i| format!("s{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let deps: Vec<Vec<usize>> = (0..n).map(|i| if i + 1 < n { vec![i + 1] } else { vec![] }).collect();
        let order = dependency_order(&refs, &deps).unwrap();
        assert_eq!(order.first(), Some(&(n - 1)));
        assert_eq!(index_of(&refs)["s42"], 42);
    }
}
