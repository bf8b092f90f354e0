use std::collections::HashMap;
use std::time::Duration;

cfg_if::cfg_if! {
    if #[cfg(target_family = "wasm")] {
        pub(crate) use web_time::Instant;
    } else {
        pub(crate) use std::time::Instant;
    }
}

#[derive(Debug, Default)]
struct TimerNode {
    start: Option<Instant>,
    elapsed: Duration,
    children: HashMap<&'static str, TimerNode>,
}

impl TimerNode {
    fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    fn stop(&mut self) {
        if let Some(start) = self.start.take() {
            self.elapsed += start.elapsed();
        }
    }

    // bank the time so far and pause, leaving the node marked active
    fn suspend(&mut self) {
        if let Some(start) = self.start {
            self.elapsed += start.elapsed();
            for t in self.children.values_mut() {
                t.suspend();
            }
        }
    }

    fn resume(&mut self) {
        if self.start.is_some() {
            self.start = Some(Instant::now());
            for t in self.children.values_mut() {
                t.resume();
            }
        }
    }

    fn print(&self, key: &str, depth: usize) {
        let tabs = format!("{: <1$}", "", 4 * depth);
        println!("{}{:} : {:?}", tabs, key, self.elapsed);
        for (k, t) in self.children.iter() {
            t.print(k, depth + 1);
        }
    }
}

/// A tree of named timers.
///
/// Timers are started as children of whichever timer is currently
/// running, so that nested calls to [`timeit!`] build up a call tree.
/// A disabled collection accepts every call but records nothing.

#[derive(Debug, Default)]
pub struct Timers {
    disabled: bool,
    stack: Vec<&'static str>,
    root: TimerNode,
}

impl Timers {
    /// A collection that ignores all timing requests
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    fn active(&mut self) -> &mut TimerNode {
        let mut node = &mut self.root;
        for key in self.stack.iter() {
            node = node.children.entry(*key).or_default();
        }
        node
    }

    /// Clear the top level timer `key` and everything beneath it
    pub fn reset_timer(&mut self, key: &'static str) {
        self.root.children.remove(key);
    }

    /// Start the timer `key` as a child of the current timer
    pub fn start_as_current(&mut self, key: &'static str) {
        if self.disabled {
            return;
        }
        self.active().children.entry(key).or_default().start();
        self.stack.push(key);
    }

    /// Stop the current timer and make its parent current
    pub fn stop_current(&mut self) {
        if self.disabled || self.stack.is_empty() {
            return;
        }
        self.active().stop();
        self.stack.pop();
    }

    pub fn suspend(&mut self) {
        if !self.disabled {
            self.root.children.values_mut().for_each(|t| t.suspend());
        }
    }

    pub fn resume(&mut self) {
        if !self.disabled {
            self.root.children.values_mut().for_each(|t| t.resume());
        }
    }

    /// Time accumulated by the timer at `path`, with `path` listing the
    /// keys from the top level down.  Zero for unknown timers.
    pub fn elapsed(&self, path: &[&str]) -> Duration {
        let mut node = &self.root;
        for key in path {
            match node.children.get(*key) {
                Some(t) => node = t,
                None => return Duration::ZERO,
            }
        }
        node.elapsed
    }

    pub fn total_time(&self) -> Duration {
        self.root
            .children
            .values()
            .fold(Duration::ZERO, |acc, t| acc + t.elapsed)
    }

    pub fn print(&self) {
        for (k, t) in self.root.children.iter() {
            t.print(k, 0);
        }
    }
}

macro_rules! timeit {
    ($timer:ident => $key:literal; $($tt:tt)+) => {

        $timer.start_as_current($key);
        $(
            $tt
        )+
        $timer.stop_current();
    }
}
pub(crate) use timeit;

macro_rules! notimeit {
    ($timer:ident; $($tt:tt)+) => {

        $timer.suspend();
        $(
            $tt
        )+
        $timer.resume();
    }
}
pub(crate) use notimeit;

#[test]
fn test_nested_timers() {
    let mut timers = Timers::default();

    timeit! {timers => "outer"; {
        timeit! {timers => "inner"; {
            std::thread::sleep(Duration::from_millis(2));
        }}
        notimeit! {timers; {
            std::thread::sleep(Duration::from_millis(50));
        }}
    }}

    let outer = timers.elapsed(&["outer"]);
    let inner = timers.elapsed(&["outer", "inner"]);
    assert!(inner >= Duration::from_millis(2));
    assert!(outer >= inner);
    assert!(outer < inner + Duration::from_millis(40));
    assert_eq!(timers.total_time(), outer);
    assert_eq!(timers.elapsed(&["missing"]), Duration::ZERO);

    timers.reset_timer("outer");
    assert_eq!(timers.elapsed(&["outer"]), Duration::ZERO);
}

#[test]
fn test_disabled_timers() {
    let mut timers = Timers::disabled();
    timeit! {timers => "outer"; {
        std::thread::sleep(Duration::from_millis(1));
    }}
    assert!(!timers.is_enabled());
    assert_eq!(timers.total_time(), Duration::ZERO);
}
