use super::fake::FakeProcessTree;
use super::*;

#[test]
fn descendants_walks_the_whole_subtree() {
    let tree = FakeProcessTree::new();
    tree.register_child(1, 2);
    tree.register_child(2, 3);
    tree.register_child(1, 4);

    let mut pids = tree.descendants(1);
    pids.sort_unstable();
    assert_eq!(pids, vec![1, 2, 3, 4]);
}

#[test]
fn kill_group_marks_the_whole_tree_dead() {
    let tree = FakeProcessTree::new();
    tree.register_child(1, 2);
    tree.kill_group(1, Signal::SIGTERM);
    assert_eq!(tree.alive(&[1, 2]), Vec::<u32>::new());
}

#[test]
fn undead_pid_survives_kill_all() {
    let tree = FakeProcessTree::new();
    tree.mark_undead(99);
    tree.kill_all(&[99], Signal::SIGKILL);
    assert_eq!(tree.alive(&[99]), vec![99]);
}

#[test]
fn live_process_probe_is_true_for_self() {
    let pid = std::process::id();
    assert!(is_alive(pid));
}

#[test]
fn process_info_reflects_registered_identity_and_death() {
    let tree = FakeProcessTree::new();
    tree.set_process_info(42, 1000, "/usr/bin/sleep");
    let info = tree.process_info(42).unwrap();
    assert_eq!(info.argv0, "/usr/bin/sleep");

    tree.mark_dead(42);
    assert!(tree.process_info(42).is_none());
}

#[test]
fn live_process_probe_is_false_for_unused_pid() {
    // PID 1 belongs to init in every container this test can run in except
    // as this test's own ancestor; instead probe a pid that almost
    // certainly has never been assigned.
    assert!(!is_alive(u32::MAX - 1));
}
