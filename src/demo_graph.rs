use graph::{reduce, CommitDag, CommitNode, DotRenderer, OutcomeState};

fn main() {
    println!("bugdag Graph Demo");
    println!("=================\n");

    // A small synthetic history: the fix on top, a failing run below it,
    // a merge of two branches, and a green tail at the bottom.
    let mut dag = CommitDag::new();
    let nodes = [
        (0, "fix00", OutcomeState::TestSuccess, vec!["bad01"]),
        (1, "bad01", OutcomeState::TestFail, vec!["bad02"]),
        (2, "bad02", OutcomeState::TestFail, vec!["mrg03"]),
        (3, "mrg03", OutcomeState::TestFail, vec!["ok04", "brk05"]),
        (4, "ok04", OutcomeState::TestSuccess, vec!["ok06"]),
        (5, "brk05", OutcomeState::BuildError, vec!["ok06"]),
        (6, "ok06", OutcomeState::TestSuccess, vec!["ok07"]),
        (7, "ok07", OutcomeState::TestSuccess, vec![]),
    ];
    for (id, hash, state, parents) in nodes {
        dag.insert(CommitNode::new(
            id,
            hash.to_string(),
            state,
            parents.into_iter().map(String::from).collect(),
        ));
    }
    dag.link_children();

    let stats = dag.stats();
    println!("History statistics:");
    println!("  Total commits: {}", stats.total_commits);
    println!("  Merge commits: {}", stats.merge_commits);
    println!("  Test failures: {}", stats.test_failures);
    println!();

    let renderer = DotRenderer::new("CommitGraph");
    println!("Full graph:");
    print!("{}", renderer.render(&dag));
    println!();

    match reduce(&dag, "fix00") {
        Ok(reduced) => {
            println!("Reduced graph ({} commit(s)):", reduced.len());
            print!("{}", renderer.render(&reduced));
        }
        Err(e) => eprintln!("Error reducing graph: {}", e),
    }
}
