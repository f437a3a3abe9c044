//! Shared command test inputs

use std::path::{Path, PathBuf};

pub(crate) const ROBOT_DOMAIN: &str = "
(define (domain robots)
  (:requirements :multi-agent :unfactored-privacy :typing)
  (:types robot location - object)
  (:predicates (at ?r - robot ?l - location))
  (:action move_r1
    :agent ?r - robot
    :parameters (?from ?to - location)
    :precondition (at ?r ?from)
    :effect (and (not (at ?r ?from)) (at ?r ?to))))
";

pub(crate) const ROBOT_PROBLEM: &str = "
(define (problem move-r1) (:domain robots)
  (:objects r1 - robot l1 l2 - location)
  (:init (at r1 l1))
  (:goal (and (at r1 l2))))
";

/// Write the robot domain and problem into `dir`
pub(crate) fn write_robot_files(dir: &Path) -> (PathBuf, PathBuf) {
    let domain = dir.join("robots_domain.pddl");
    let problem = dir.join("robots_problem.pddl");
    std::fs::write(&domain, ROBOT_DOMAIN).unwrap();
    std::fs::write(&problem, ROBOT_PROBLEM).unwrap();
    (domain, problem)
}
