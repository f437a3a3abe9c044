//! Shared test inputs

/// One robot type moving between locations, with a private predicate
pub(crate) const ROBOT_DOMAIN: &str = "
; robots moving between locations
(define (domain robots)
  (:requirements :multi-agent :unfactored-privacy :typing)
  (:types robot location - object)
  (:predicates
    (at ?r - robot ?l - location)
    (:private ?r - robot
      (busy ?r - robot)))
  (:action move
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
