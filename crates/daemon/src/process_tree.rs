// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-tree utilities (spec §4.2): pure queries and signals over the
//! kernel's view of a pid subtree. None of these mutate daemon state; the
//! job manager's stop sequence and `ports` queries are the only callers.

use std::collections::HashSet;

use nix::sys::signal::Signal;
use nix::unistd::Pid;
use oj_core::job::PortInfo;

/// Identity facts about a live process, used by bootstrap reconciliation to
/// tell a surviving child apart from an unrelated program that reused its
/// pid (spec §3.3 invariant 6, §4.7 step 5).
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessInfo {
    pub start_time_secs: i64,
    pub argv0: String,
}

/// Abstraction over kernel process-tree introspection, so the stop
/// sequence and ports query can be driven by a deterministic fake in tests
/// (spec §4.2 describes these as "pure queries over the kernel's view").
pub trait ProcessTree: Send + Sync + 'static {
    /// `root_pid` and all of its live descendants, recursively.
    fn descendants(&self, root_pid: u32) -> Vec<u32>;
    /// The subset of `pids` that are currently alive.
    fn alive(&self, pids: &[u32]) -> Vec<u32>;
    /// Send `sig` to each of `pids` individually, ignoring "no such process".
    fn kill_all(&self, pids: &[u32], sig: Signal);
    /// Send `sig` to the process group led by `pid` (i.e. `kill(-pid, sig)`).
    fn kill_group(&self, pid: u32, sig: Signal);
    /// Listening sockets owned by any process in `root_pid`'s subtree.
    fn listening_ports(&self, root_pid: u32) -> Vec<PortInfo>;
    /// Start time and argv[0] of `pid`, if it currently exists.
    fn process_info(&self, pid: u32) -> Option<ProcessInfo>;
}

/// The real implementation, backed by `sysinfo` for process enumeration
/// and `listeners` for socket-table inspection.
#[derive(Default)]
pub struct SysProcessTree;

impl ProcessTree for SysProcessTree {
    fn descendants(&self, root_pid: u32) -> Vec<u32> {
        let mut sys = sysinfo::System::new();
        sys.refresh_processes(sysinfo::ProcessesToUpdate::All, true);

        let root = sysinfo::Pid::from_u32(root_pid);
        let mut out = vec![root_pid];
        let mut frontier = vec![root];
        let mut seen: HashSet<sysinfo::Pid> = HashSet::from([root]);

        while let Some(parent) = frontier.pop() {
            for (pid, process) in sys.processes() {
                if process.parent() == Some(parent) && seen.insert(*pid) {
                    out.push(pid.as_u32());
                    frontier.push(*pid);
                }
            }
        }
        out
    }

    fn alive(&self, pids: &[u32]) -> Vec<u32> {
        pids.iter().copied().filter(|&pid| is_alive(pid)).collect()
    }

    fn kill_all(&self, pids: &[u32], sig: Signal) {
        for &pid in pids {
            let _ = nix::sys::signal::kill(Pid::from_raw(pid as i32), sig);
        }
    }

    fn kill_group(&self, pid: u32, sig: Signal) {
        // Negated pid: signal the whole process group at once (spec §4.1, §4.4).
        let _ = nix::sys::signal::kill(Pid::from_raw(-(pid as i32)), sig);
    }

    fn listening_ports(&self, root_pid: u32) -> Vec<PortInfo> {
        let subtree: HashSet<u32> = self.descendants(root_pid).into_iter().collect();
        let Ok(all) = listeners::get_all() else { return Vec::new() };
        all.into_iter()
            .filter(|l| subtree.contains(&l.process.pid))
            .map(|l| PortInfo {
                port: l.socket.port(),
                protocol: if l.socket.is_ipv6() { "tcp6".to_string() } else { "tcp".to_string() },
                address: l.socket.ip().to_string(),
                pid: l.process.pid,
            })
            .collect()
    }

    fn process_info(&self, pid: u32) -> Option<ProcessInfo> {
        let mut sys = sysinfo::System::new();
        sys.refresh_processes(sysinfo::ProcessesToUpdate::Some(&[sysinfo::Pid::from_u32(pid)]), true);
        let process = sys.process(sysinfo::Pid::from_u32(pid))?;
        let argv0 = process.cmd().first().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        Some(ProcessInfo { start_time_secs: process.start_time() as i64, argv0 })
    }
}

/// Zero-signal probe: `kill(pid, 0)` succeeds iff the process exists and
/// is visible to us.
pub fn is_alive(pid: u32) -> bool {
    nix::sys::signal::kill(Pid::from_raw(pid as i32), None).is_ok()
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use std::collections::HashMap;

    /// A `ProcessTree` entirely driven by test setup: every pid starts
    /// alive, `kill_all`/`kill_group` mark pids dead unless registered as
    /// undead via [`FakeProcessTree::mark_undead`].
    #[derive(Default)]
    pub struct FakeProcessTree {
        state: parking_lot::Mutex<Inner>,
    }

    #[derive(Default)]
    struct Inner {
        children: HashMap<u32, Vec<u32>>,
        dead: std::collections::HashSet<u32>,
        undead: std::collections::HashSet<u32>,
        ports: HashMap<u32, Vec<PortInfo>>,
        info: HashMap<u32, ProcessInfo>,
    }

    impl FakeProcessTree {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn register_child(&self, parent: u32, child: u32) {
            self.state.lock().children.entry(parent).or_default().push(child);
        }

        pub fn mark_undead(&self, pid: u32) {
            self.state.lock().undead.insert(pid);
        }

        pub fn mark_dead(&self, pid: u32) {
            self.state.lock().dead.insert(pid);
        }

        pub fn set_ports(&self, root_pid: u32, ports: Vec<PortInfo>) {
            self.state.lock().ports.insert(root_pid, ports);
        }

        pub fn set_process_info(&self, pid: u32, start_time_secs: i64, argv0: impl Into<String>) {
            self.state.lock().info.insert(pid, ProcessInfo { start_time_secs, argv0: argv0.into() });
        }
    }

    impl ProcessTree for FakeProcessTree {
        fn descendants(&self, root_pid: u32) -> Vec<u32> {
            let inner = self.state.lock();
            let mut out = vec![root_pid];
            let mut frontier = vec![root_pid];
            while let Some(p) = frontier.pop() {
                if let Some(children) = inner.children.get(&p) {
                    for &c in children {
                        out.push(c);
                        frontier.push(c);
                    }
                }
            }
            out
        }

        fn alive(&self, pids: &[u32]) -> Vec<u32> {
            let inner = self.state.lock();
            pids.iter().copied().filter(|p| !inner.dead.contains(p)).collect()
        }

        fn kill_all(&self, pids: &[u32], _sig: Signal) {
            let mut inner = self.state.lock();
            for &p in pids {
                if !inner.undead.contains(&p) {
                    inner.dead.insert(p);
                }
            }
        }

        fn kill_group(&self, pid: u32, sig: Signal) {
            let members = self.descendants(pid);
            self.kill_all(&members, sig);
        }

        fn listening_ports(&self, root_pid: u32) -> Vec<PortInfo> {
            self.state.lock().ports.get(&root_pid).cloned().unwrap_or_default()
        }

        fn process_info(&self, pid: u32) -> Option<ProcessInfo> {
            let inner = self.state.lock();
            if inner.dead.contains(&pid) {
                return None;
            }
            inner.info.get(&pid).cloned()
        }
    }
}

#[cfg(test)]
#[path = "process_tree_tests.rs"]
mod tests;
