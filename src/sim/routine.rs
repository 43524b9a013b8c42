//! Cooperative routines
//!
//! A routine is a multi-frame behavior written as an explicit state machine.
//! Each call to [`Routine::resume`] runs it up to its next suspension point,
//! where it says what it is waiting for. The scheduler parks it until that
//! wait is satisfied and resumes it on a later frame pass. Nothing here ever
//! blocks; a routine only ever runs while the frame loop drives it.
//!
//! Every task carries a [`Ticket`]. Owners bump their generation whenever
//! their state changes or a new routine is started for them, which turns
//! every older ticket stale. Stale tasks are dropped at their next
//! suspension point, so an owner has at most one live routine.

/// What a parked routine is waiting for
pub enum Wait<C> {
    /// Resume on the next frame pass
    NextFrame,
    /// Resume once this many seconds of frame time have elapsed
    Seconds(f32),
    /// Resume on the first frame pass where the predicate holds
    Until(fn(&C) -> bool),
}

impl<C> std::fmt::Debug for Wait<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Wait::NextFrame => write!(f, "NextFrame"),
            Wait::Seconds(s) => write!(f, "Seconds({s})"),
            Wait::Until(_) => write!(f, "Until(..)"),
        }
    }
}

/// Outcome of resuming a routine
#[derive(Debug)]
pub enum Step<C> {
    Yield(Wait<C>),
    Done,
}

/// A suspendable behavior over a context `C`
pub trait Routine<C> {
    fn resume(&mut self, ctx: &mut C) -> Step<C>;
}

/// Who a routine runs on behalf of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Disc,
    Player,
    Level,
    /// One of the hint channels
    Hint(u8),
}

/// Binds a task to one generation of its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub owner: Owner,
    pub generation: u32,
}

/// A context able to host routines
pub trait RoutineHost: Sized {
    type Routine: Routine<Self>;

    fn scheduler_mut(&mut self) -> &mut Scheduler<Self, Self::Routine>;

    /// Invalidate every outstanding ticket of `owner` and issue a new one
    fn issue_ticket(&mut self, owner: Owner) -> Ticket;

    /// Whether `ticket` still belongs to the owner's current generation
    fn is_live(&self, ticket: Ticket) -> bool;

    /// Frame time of the pass currently running
    fn frame_dt(&self) -> f32;

    /// Index of the frame currently running
    fn frame_index(&self) -> u64;
}

struct Task<C, R> {
    ticket: Ticket,
    wait: Wait<C>,
    routine: R,
    /// Frame in which the task last suspended
    parked: u64,
}

/// Parked routines awaiting their next resume
pub struct Scheduler<C, R> {
    tasks: Vec<Task<C, R>>,
}

impl<C, R> Default for Scheduler<C, R> {
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl<C, R> std::fmt::Debug for Scheduler<C, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

impl<C, R> Scheduler<C, R> {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of parked tasks belonging to `owner` (live or not)
    pub fn count_for(&self, owner: Owner) -> usize {
        self.tasks.iter().filter(|t| t.ticket.owner == owner).count()
    }
}

/// Start `routine` for `owner`, running it up to its first suspension point
///
/// Any routine already live for the owner is cancelled.
pub fn start<C: RoutineHost>(ctx: &mut C, owner: Owner, mut routine: C::Routine) {
    let ticket = ctx.issue_ticket(owner);
    match routine.resume(ctx) {
        Step::Yield(wait) => {
            // The routine may have changed its owner's state on the way
            if ctx.is_live(ticket) {
                let parked = ctx.frame_index();
                ctx.scheduler_mut().tasks.push(Task {
                    ticket,
                    wait,
                    routine,
                    parked,
                });
            }
        }
        Step::Done => {}
    }
}

/// Run one frame pass over every parked routine
///
/// Routines started during the pass are parked but not resumed until the
/// next pass. A `Seconds` wait is only charged for frames that begin after
/// it was parked, wherever in the frame the routine suspended.
pub fn run_frame<C: RoutineHost>(ctx: &mut C) {
    let dt = ctx.frame_dt();
    let frame = ctx.frame_index();
    let mut pending = std::mem::take(&mut ctx.scheduler_mut().tasks);
    let mut kept = Vec::with_capacity(pending.len());

    for mut task in pending.drain(..) {
        if !ctx.is_live(task.ticket) {
            log::trace!("Dropping stale routine for {:?}", task.ticket.owner);
            continue;
        }

        let ready = match &mut task.wait {
            Wait::NextFrame => true,
            Wait::Seconds(remaining) => {
                if task.parked != frame {
                    *remaining -= dt;
                }
                *remaining <= 0.0
            }
            Wait::Until(predicate) => predicate(ctx),
        };
        if !ready {
            kept.push(task);
            continue;
        }

        match task.routine.resume(ctx) {
            Step::Yield(wait) => {
                if ctx.is_live(task.ticket) {
                    task.wait = wait;
                    task.parked = frame;
                    kept.push(task);
                }
            }
            Step::Done => {}
        }
    }

    let started = std::mem::take(&mut ctx.scheduler_mut().tasks);
    kept.extend(started);
    ctx.scheduler_mut().tasks = kept;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal host: a counter and a log of what ran
    #[derive(Default)]
    struct Bench {
        scheduler: Scheduler<Bench, Script>,
        generation: u32,
        dt: f32,
        frame: u64,
        flag: bool,
        log: Vec<&'static str>,
    }

    enum Script {
        Steps(u8),
        Timer(bool),
        Gate(bool),
        Spawner,
    }

    impl Routine<Bench> for Script {
        fn resume(&mut self, ctx: &mut Bench) -> Step<Bench> {
            match self {
                Script::Steps(n) => {
                    ctx.log.push("step");
                    if *n == 0 {
                        return Step::Done;
                    }
                    *n -= 1;
                    Step::Yield(Wait::NextFrame)
                }
                Script::Timer(fired) => {
                    if *fired {
                        ctx.log.push("timer");
                        return Step::Done;
                    }
                    *fired = true;
                    Step::Yield(Wait::Seconds(0.25))
                }
                Script::Gate(opened) => {
                    if *opened {
                        ctx.log.push("gate");
                        return Step::Done;
                    }
                    *opened = true;
                    Step::Yield(Wait::Until(|b| b.flag))
                }
                Script::Spawner => {
                    start(ctx, Owner::Level, Script::Steps(1));
                    Step::Done
                }
            }
        }
    }

    impl RoutineHost for Bench {
        type Routine = Script;

        fn scheduler_mut(&mut self) -> &mut Scheduler<Self, Script> {
            &mut self.scheduler
        }

        fn issue_ticket(&mut self, owner: Owner) -> Ticket {
            self.generation += 1;
            Ticket {
                owner,
                generation: self.generation,
            }
        }

        fn is_live(&self, ticket: Ticket) -> bool {
            ticket.generation == self.generation
        }

        fn frame_dt(&self) -> f32 {
            self.dt
        }

        fn frame_index(&self) -> u64 {
            self.frame
        }
    }

    /// One frame of the bench: advance the index, then the routine pass
    fn tick(bench: &mut Bench) {
        bench.frame += 1;
        run_frame(bench);
    }

    #[test]
    fn test_start_runs_to_first_yield() {
        let mut bench = Bench::default();
        start(&mut bench, Owner::Player, Script::Steps(2));
        assert_eq!(bench.log, vec!["step"]);
        assert_eq!(bench.scheduler.len(), 1);

        tick(&mut bench);
        tick(&mut bench);
        assert_eq!(bench.log.len(), 3);
        assert!(bench.scheduler.is_empty());
    }

    #[test]
    fn test_seconds_wait_accumulates_frame_time() {
        let mut bench = Bench {
            dt: 0.1,
            ..Default::default()
        };
        start(&mut bench, Owner::Disc, Script::Timer(false));
        tick(&mut bench);
        tick(&mut bench);
        assert!(bench.log.is_empty());
        tick(&mut bench);
        assert_eq!(bench.log, vec!["timer"]);
    }

    #[test]
    fn test_timer_started_mid_frame_is_charged_from_next_frame() {
        let mut bench = Bench {
            dt: 0.1,
            ..Default::default()
        };
        // Started during frame 1, before that frame's pass
        bench.frame = 1;
        start(&mut bench, Owner::Disc, Script::Timer(false));
        run_frame(&mut bench);
        tick(&mut bench);
        assert!(bench.log.is_empty());
        tick(&mut bench);
        assert!(bench.log.is_empty());
        tick(&mut bench);
        assert_eq!(bench.log, vec!["timer"]);
    }

    #[test]
    fn test_until_waits_for_predicate() {
        let mut bench = Bench::default();
        start(&mut bench, Owner::Hint(0), Script::Gate(false));
        tick(&mut bench);
        tick(&mut bench);
        assert!(bench.log.is_empty());
        bench.flag = true;
        tick(&mut bench);
        assert_eq!(bench.log, vec!["gate"]);
    }

    #[test]
    fn test_new_ticket_cancels_previous_routine() {
        let mut bench = Bench::default();
        start(&mut bench, Owner::Player, Script::Steps(5));
        bench.issue_ticket(Owner::Player);
        tick(&mut bench);
        assert_eq!(bench.log, vec!["step"]);
        assert!(bench.scheduler.is_empty());
    }

    #[test]
    fn test_routine_started_mid_pass_waits_for_next_pass() {
        let mut bench = Bench::default();
        bench.scheduler.tasks.push(Task {
            ticket: Ticket {
                owner: Owner::Level,
                generation: 0,
            },
            wait: Wait::NextFrame,
            routine: Script::Spawner,
            parked: 0,
        });
        tick(&mut bench);
        // Spawner ran, spawned Steps(1) which ran once immediately
        assert_eq!(bench.log, vec!["step"]);
        assert_eq!(bench.scheduler.count_for(Owner::Level), 1);
        tick(&mut bench);
        assert_eq!(bench.log, vec!["step", "step"]);
    }
}
