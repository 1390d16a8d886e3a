use super::{
    code::{Code, Register},
    command_state::{CodeField, CommandState},
    dictionary::{
        NOUN_ALARM_CODES, NOUN_CHECKLIST_ACTION, NOUN_NONE, NOUN_VEL_FUEL_ALT, VERB_ALARM_DISPLAY,
        VERB_DISPLAY_DECIMAL, VERB_LAMP_TEST, VERB_MONITOR_DECIMAL, VERB_PLEASE_PERFORM,
        VERB_RUN_PROGRAM, noun_name, verb_name,
    },
    directive::{Directive, LampTestSnapshot},
    dsky_context::DskyContext,
    indicators::{IndicatorName, IndicatorSet},
    key::Key,
    noun_layout::NounLayout,
    program::{PendingConfirmation, Program},
};
use crate::advisory::AdvisoryRequest;
use crate::flight_control::{FlightComputer, FlightState};
use crate::event;
use std::time::Duration;
use strum_macros::Display;

/// Externally visible state of the command interpreter.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum InterpreterState {
    Idle,
    EnteringVerb,
    EnteringNoun,
    AwaitingConfirmation,
    PriorityLocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryField {
    Verb,
    Noun,
}

/// Digit entry in progress, remembering the code to restore on cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Idle,
    Typing { field: EntryField, buffer: String, prior: Code },
}

/// Finite-state machine behind the DSKY keypad.
///
/// It owns the [`CommandState`] and reaches the flight model, lamps and mission log only
/// through a [`DskyContext`] for the duration of one call. Timed effects (activity flashes,
/// lamp-test restore) leave as [`Directive`]s; the interpreter never waits on a clock.
#[derive(Debug, Clone)]
pub struct CommandInterpreter {
    state: CommandState,
    entry: Entry,
    pending: Option<PendingConfirmation>,
    /// Sequence number of the running lamp test.
    lamp_test: Option<u64>,
    lamp_test_seq: u64,
}

impl CommandInterpreter {
    const COMP_ACTY_FLASH: Duration = Duration::from_millis(100);
    const LAMP_TEST_DURATION: Duration = Duration::from_millis(1500);
    const LAMP_TEST_PATTERN: u32 = 88_888;
    const MAX_ENTRY_DIGITS: usize = 2;

    pub fn new(state: CommandState) -> Self {
        Self { state, entry: Entry::Idle, pending: None, lamp_test: None, lamp_test_seq: 0 }
    }

    /// Replaces the display for a new mission and drops any entry, confirmation or lamp test.
    pub fn reset(&mut self, state: CommandState) {
        self.state = state;
        self.entry = Entry::Idle;
        self.pending = None;
        self.lamp_test = None;
    }

    pub fn command_state(&self) -> &CommandState { &self.state }
    pub fn pending(&self) -> Option<PendingConfirmation> { self.pending }
    pub fn lamp_test_active(&self) -> bool { self.lamp_test.is_some() }

    pub fn state(&self) -> InterpreterState {
        if self.state.priority_lock {
            return InterpreterState::PriorityLocked;
        }
        match (&self.entry, self.pending) {
            (Entry::Typing { field: EntryField::Verb, .. }, _) => InterpreterState::EnteringVerb,
            (Entry::Typing { field: EntryField::Noun, .. }, _) => InterpreterState::EnteringNoun,
            (Entry::Idle, Some(_)) => InterpreterState::AwaitingConfirmation,
            (Entry::Idle, None) => InterpreterState::Idle,
        }
    }

    /// Feeds one key press through the state machine.
    ///
    /// While an alarm holds the priority display only RSET is honoured; PRO is silently
    /// ignored and everything else lights OPR ERR.
    pub fn handle_key(&mut self, key: Key, ctx: &mut DskyContext<'_>) {
        event!("Key {key} in state {}", self.state());
        if self.state.priority_lock {
            match key {
                Key::Rset => self.reset_display(ctx),
                Key::Pro => ctx.flash(IndicatorName::CompActy, Self::COMP_ACTY_FLASH),
                _ => {
                    ctx.indicators.set(IndicatorName::OprErr, true);
                    event!("Key {key} rejected, alarm {:?} on display", self.state.alarm_code);
                }
            }
            return;
        }
        match key {
            Key::Pro => self.proceed(ctx),
            Key::Rset => self.reset_display(ctx),
            Key::KeyRel => {
                self.cancel_entry();
                ctx.operator("KEY REL");
            }
            other => {
                ctx.indicators.set(IndicatorName::OprErr, false);
                self.handle_entry_key(other, ctx);
            }
        }
    }

    fn handle_entry_key(&mut self, key: Key, ctx: &mut DskyContext<'_>) {
        match key {
            Key::Verb => self.begin_entry(EntryField::Verb),
            Key::Noun => self.begin_entry(EntryField::Noun),
            Key::Clr => self.cancel_entry(),
            Key::Entr => self.enter(ctx),
            Key::Digit(d) => self.push_digit(d),
            Key::ThrustUp => ctx.flight.adjust_thrust(FlightComputer::THRUST_STEP),
            Key::ThrustDown => ctx.flight.adjust_thrust(-FlightComputer::THRUST_STEP),
            Key::LampTest => self.dispatch(VERB_LAMP_TEST, NOUN_NONE, ctx),
            Key::Pro | Key::Rset | Key::KeyRel => {}
        }
    }

    fn field_mut(&mut self, field: EntryField) -> &mut CodeField {
        match field {
            EntryField::Verb => &mut self.state.verb,
            EntryField::Noun => &mut self.state.noun,
        }
    }

    fn begin_entry(&mut self, field: EntryField) {
        self.keep_typed();
        let prior = self.field_mut(field).code().unwrap_or(Code::ZERO);
        *self.field_mut(field) = CodeField::Typing(String::new());
        self.entry = Entry::Typing { field, buffer: String::new(), prior };
    }

    fn push_digit(&mut self, digit: u8) {
        let Entry::Typing { field, buffer, .. } = &mut self.entry else {
            return;
        };
        if buffer.len() >= Self::MAX_ENTRY_DIGITS || digit > 9 {
            return;
        }
        buffer.push(char::from(b'0' + digit));
        let (field, echo) = (*field, buffer.clone());
        *self.field_mut(field) = CodeField::Typing(echo);
    }

    /// Leaves an entry by switching fields: typed digits stay in the field, a blank field
    /// gets its previous code back.
    fn keep_typed(&mut self) {
        if let Entry::Typing { field, buffer, prior } = std::mem::replace(&mut self.entry, Entry::Idle) {
            let code = if buffer.is_empty() { prior } else { Code::from_buffer(&buffer).unwrap_or(prior) };
            *self.field_mut(field) = CodeField::Set(code);
        }
    }

    /// Drops the typed digits and puts the previous code back.
    fn cancel_entry(&mut self) {
        if let Entry::Typing { field, prior, .. } = std::mem::replace(&mut self.entry, Entry::Idle) {
            *self.field_mut(field) = CodeField::Set(prior);
        }
    }

    fn enter(&mut self, ctx: &mut DskyContext<'_>) {
        match std::mem::replace(&mut self.entry, Entry::Idle) {
            Entry::Idle => {
                let verb = self.state.verb_code();
                if !verb.is_zero() {
                    self.dispatch(verb, self.state.noun_code(), ctx);
                }
            }
            Entry::Typing { field, buffer, prior } => {
                let committed = Code::from_buffer(&buffer).unwrap_or(prior);
                *self.field_mut(field) = CodeField::Set(committed);
                let (verb, other_set) = match field {
                    EntryField::Verb => (committed, self.state.noun.is_set_nonzero()),
                    EntryField::Noun => (self.state.verb_code(), self.state.verb.is_set_nonzero()),
                };
                if other_set {
                    self.dispatch(verb, self.state.noun_code(), ctx);
                }
            }
        }
    }

    /// Executes a committed verb/noun pair.
    ///
    /// `V37` switches programs, `V35` runs the lamp test and every other pair is handed to
    /// the advisory collaborator, whose answer comes back later as a ground log entry.
    fn dispatch(&mut self, verb: Code, noun: Code, ctx: &mut DskyContext<'_>) {
        ctx.flash(IndicatorName::CompActy, Self::COMP_ACTY_FLASH);
        if verb != VERB_MONITOR_DECIMAL {
            ctx.operator(format!("CMD: {} / {}", verb_name(verb), noun_name(noun)));
        }
        if verb == VERB_RUN_PROGRAM {
            self.run_program(noun, ctx);
        } else if verb == VERB_LAMP_TEST {
            self.start_lamp_test(ctx);
        } else {
            let request = AdvisoryRequest::new(&ctx.flight.state(), self.state.program, verb, noun);
            ctx.directives.push(Directive::Advise(request));
        }
    }

    fn run_program(&mut self, noun: Code, ctx: &mut DskyContext<'_>) {
        let Some(program) = Program::from_code(noun) else {
            ctx.indicators.set(IndicatorName::OprErr, true);
            event!("Unrecognized program code {noun}");
            return;
        };
        self.state.program = noun;
        ctx.ground(format!("PROG CHANGE: P{noun}"));
        match program {
            Program::BrakingPhase => self.arm_ignition(program, ctx),
            Program::ManualDescent if ctx.flight.is_active() => {
                ctx.ground("P66 MANUAL ENABLED. YOU HAVE CONTROL.");
            }
            Program::ManualDescent => self.arm_ignition(program, ctx),
            Program::Idle => {
                ctx.flight.idle();
                self.pending = None;
                ctx.ground("P00 IDLE. ENGINE OFF.");
            }
            Program::ApproachPhase => {}
        }
    }

    /// Shows `V50 N25` with the program number in R1 and waits for PRO.
    fn arm_ignition(&mut self, program: Program, ctx: &mut DskyContext<'_>) {
        let code = program.code();
        self.state.verb = CodeField::Set(VERB_PLEASE_PERFORM);
        self.state.noun = CodeField::Set(NOUN_CHECKLIST_ACTION);
        self.state.registers = [Register::positive(u32::from(code.value())), Register::zero(), Register::zero()];
        self.pending = Some(PendingConfirmation::Ignition { program });
        ctx.ground(format!("P{code} SELECTED. PLEASE PERFORM (PRO)."));
    }

    fn proceed(&mut self, ctx: &mut DskyContext<'_>) {
        ctx.flash(IndicatorName::CompActy, Self::COMP_ACTY_FLASH);
        self.cancel_entry();
        match self.pending.take() {
            Some(PendingConfirmation::Ignition { program }) => {
                ctx.flight.ignite(program.ignition_thrust());
                ctx.ground(if program == Program::BrakingPhase {
                    "IGNITION. AUTOMATIC BRAKING."
                } else {
                    "IGNITION. MANUAL CONTROL."
                });
                self.state.verb = CodeField::Set(VERB_MONITOR_DECIMAL);
                self.state.noun = CodeField::Set(NOUN_VEL_FUEL_ALT);
                self.refresh_registers(&ctx.flight.state(), ctx.elapsed_secs);
            }
            None => ctx.operator("PROCEED"),
        }
    }

    /// RSET: drops the priority display and returns to the descent monitor.
    fn reset_display(&mut self, ctx: &mut DskyContext<'_>) {
        self.cancel_entry();
        self.state.priority_lock = false;
        self.state.alarm_code = None;
        self.state.verb = CodeField::Set(VERB_MONITOR_DECIMAL);
        self.state.noun = CodeField::Set(NOUN_VEL_FUEL_ALT);
        for lamp in [IndicatorName::OprErr, IndicatorName::Prog, IndicatorName::Vel] {
            ctx.indicators.set(lamp, false);
        }
        ctx.operator("RSET");
    }

    /// Hijacks the display for a scenario alarm and locks out normal input until RSET.
    ///
    /// # Arguments
    /// * `code` – Alarm code shown verbatim in R1.
    /// * `message` – Optional explanation for the log, `SYSTEM ERROR` otherwise.
    pub fn raise_alarm(&mut self, code: &str, message: Option<&str>, ctx: &mut DskyContext<'_>) {
        self.lock_alarm(code, ctx);
        ctx.ground(format!("ALARM {code}. {}", message.unwrap_or("SYSTEM ERROR")));
    }

    /// Puts `code` on the priority display (`V05 N09`, R1 = code) and lights OPR ERR and
    /// PROG. Logging is left to the caller.
    pub fn lock_alarm(&mut self, code: &str, ctx: &mut DskyContext<'_>) {
        self.cancel_entry();
        self.state.priority_lock = true;
        self.state.alarm_code = Some(code.to_string());
        self.state.verb = CodeField::Set(VERB_ALARM_DISPLAY);
        self.state.noun = CodeField::Set(NOUN_ALARM_CODES);
        self.state.registers = [
            Register::Raw(code.to_string()),
            Register::Raw("00000".to_string()),
            Register::Raw("00000".to_string()),
        ];
        ctx.indicators.set(IndicatorName::OprErr, true);
        ctx.indicators.set(IndicatorName::Prog, true);
    }

    fn start_lamp_test(&mut self, ctx: &mut DskyContext<'_>) {
        if self.lamp_test.is_some() {
            event!("Lamp test already running");
            return;
        }
        self.lamp_test_seq += 1;
        let mut indicators = ctx.indicators.clone();
        // the activity flash that started the test must not be restored as lit
        indicators.set(IndicatorName::CompActy, false);
        let snapshot = LampTestSnapshot { seq: self.lamp_test_seq, indicators, registers: self.state.registers.clone() };
        *ctx.indicators = IndicatorSet::all_on();
        self.state.registers = std::array::from_fn(|_| Register::positive(Self::LAMP_TEST_PATTERN));
        self.lamp_test = Some(self.lamp_test_seq);
        ctx.directives.push(Directive::EndLampTest { duration: Self::LAMP_TEST_DURATION, snapshot });
    }

    /// Puts back what the lamp test replaced. Snapshots of an older test are ignored.
    /// An alarm raised during the test keeps its display and lamps.
    pub fn end_lamp_test(&mut self, snapshot: LampTestSnapshot, indicators: &mut IndicatorSet) {
        if self.lamp_test != Some(snapshot.seq) {
            return;
        }
        self.lamp_test = None;
        *indicators = snapshot.indicators;
        if self.state.priority_lock {
            indicators.set(IndicatorName::OprErr, true);
            indicators.set(IndicatorName::Prog, true);
        } else {
            self.state.registers = snapshot.registers;
        }
    }

    /// Rewrites the registers from flight data while a monitor or display verb is up.
    /// Nouns without a register layout keep their contents.
    pub fn refresh_registers(&mut self, flight: &FlightState, elapsed_secs: u64) {
        if self.state.priority_lock || self.lamp_test.is_some() {
            return;
        }
        let Some(verb) = self.state.verb.code() else { return };
        if verb != VERB_MONITOR_DECIMAL && verb != VERB_DISPLAY_DECIMAL {
            return;
        }
        if let Some(layout) = self.state.noun.code().and_then(NounLayout::lookup) {
            self.state.registers = layout.render(flight, elapsed_secs);
        }
    }
}
