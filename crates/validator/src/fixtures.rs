//! Shared test problems

use pddl::{
    ActionSchema, AgentSpec, Atom, ClassicalSerializer, Literal, MultiAgentProblem,
    MultiAgentWriter, ParseOptions, PddlReader, PlanningTask, PredicateSignature, TypedParam,
    UnfactoredWriter,
};

fn at(robot: &str, place: &str) -> Atom {
    Atom::new("at", [robot, place])
}

fn free(place: &str) -> Atom {
    Atom::new("free", [place])
}

fn move_action() -> ActionSchema {
    ActionSchema::new("move", "?r")
        .with_parameter("?from", "location")
        .with_parameter("?to", "location")
        .with_precondition(Literal::positive(at("?r", "?from")))
        .with_precondition(Literal::positive(free("?to")))
        .with_effect(Literal::negative(at("?r", "?from")))
        .with_effect(Literal::negative(free("?to")))
        .with_effect(Literal::positive(at("?r", "?to")))
        .with_effect(Literal::positive(free("?from")))
}

fn robots_domain(name: &str) -> MultiAgentProblem {
    MultiAgentProblem::new(name, "robots")
        .with_type("robot", "object")
        .with_type("location", "object")
        .with_predicate(PredicateSignature::new(
            "at",
            vec![TypedParam::new("?r", "robot"), TypedParam::new("?l", "location")],
        ))
        .with_predicate(PredicateSignature::new(
            "free",
            vec![TypedParam::new("?l", "location")],
        ))
}

/// r1 at l1 must reach l2
pub(crate) fn single_robot() -> MultiAgentProblem {
    robots_domain("move-r1")
        .with_agent(AgentSpec::new("r1", "robot").with_action(move_action()))
        .with_object("l1", "location")
        .with_object("l2", "location")
        .with_fact(at("r1", "l1"))
        .with_fact(free("l2"))
        .with_goal(Literal::positive(at("r1", "l2")))
}

/// r1 wants l2, where r2 stands; r2 must first leave for l3
pub(crate) fn two_robots() -> MultiAgentProblem {
    robots_domain("shift")
        .with_agent(AgentSpec::new("r1", "robot").with_action(move_action()))
        .with_agent(AgentSpec::new("r2", "robot").with_action(move_action()))
        .with_object("l1", "location")
        .with_object("l2", "location")
        .with_object("l3", "location")
        .with_fact(at("r1", "l1"))
        .with_fact(at("r2", "l2"))
        .with_fact(free("l3"))
        .with_goal(Literal::positive(at("r1", "l2")))
        .with_goal(Literal::positive(at("r2", "l3")))
}

/// Classical translation of `two_robots`
pub(crate) fn classical_robots() -> PlanningTask {
    let problem = two_robots();
    let writer = UnfactoredWriter::new(&problem);
    let ma = PlanningTask::parse(
        &writer.domain_text().unwrap(),
        &writer.problem_text().unwrap(),
        ParseOptions::default(),
    )
    .unwrap();
    PddlReader::default()
        .from_text(
            &ClassicalSerializer::domain_text(&ma.domain),
            &ClassicalSerializer::problem_text(&ma.domain, &ma.problem).unwrap(),
        )
        .unwrap()
}
