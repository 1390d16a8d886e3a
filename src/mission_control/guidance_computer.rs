use super::mission_clock::MissionClock;
use super::mission_log::{MissionLog, Role};
use crate::dsky::{
    CommandInterpreter, CommandState, Directive, DskyContext, IndicatorName, IndicatorSet, InterpreterState, Key,
    LampTestSnapshot, PendingConfirmation,
};
use crate::flight_control::{FlightComputer, FlightState, GroundOutcome};
use crate::scenario::{EventEffect, EventEngine, Scenario, ScenarioError};
use crate::{event, info, warn};
use chrono::{DateTime, Utc};

/// The simulation kernel: command interpreter, flight model, event engine, lamps, mission
/// clock and mission log behind two entry points, [`GuidanceComputer::handle_key`] and
/// [`GuidanceComputer::advance`].
///
/// It is strictly single threaded and never waits. Anything that has to happen later is
/// queued as a [`Directive`] for the host to collect with [`GuidanceComputer::take_directives`].
#[derive(Debug)]
pub struct GuidanceComputer {
    flight: FlightComputer,
    interpreter: CommandInterpreter,
    indicators: IndicatorSet,
    log: MissionLog,
    events: EventEngine,
    clock: MissionClock,
    directives: Vec<Directive>,
    /// Tick time not yet integrated.
    pending_dt: f64,
    /// Outcome lamps that flash expiries must not switch off.
    latched: Vec<IndicatorName>,
    /// Flash expiries that arrived during a lamp test.
    deferred_clears: Vec<IndicatorName>,
    /// Whether the built-in 1202 alarm may fire on the next low, fast step.
    exec_overflow_armed: bool,
    scenario_id: Option<String>,
}

impl GuidanceComputer {
    /// Accumulated time below this is held back for the next tick.
    pub const MIN_STEP: f64 = 0.05;
    /// Longest interval integrated in one step; anything beyond it is dropped.
    pub const MAX_STEP: f64 = 0.5;
    /// Below this altitude (m) a descent faster than [`Self::EXEC_OVERFLOW_VELOCITY`]
    /// overloads the executive.
    pub const EXEC_OVERFLOW_ALTITUDE: f64 = 3000.0;
    pub const EXEC_OVERFLOW_VELOCITY: f64 = -80.0;
    const EXEC_OVERFLOW_CODE: &'static str = "01202";

    pub fn new() -> Self {
        let mut log = MissionLog::new();
        log.push(Role::Ground, "SYSTEM READY. AWAITING COMMANDS.");
        Self {
            flight: FlightComputer::default(),
            interpreter: CommandInterpreter::new(CommandState::default()),
            indicators: IndicatorSet::initial(),
            log,
            events: EventEngine::default(),
            clock: MissionClock::default(),
            directives: Vec::new(),
            pending_dt: 0.0,
            latched: Vec::new(),
            deferred_clears: Vec::new(),
            exec_overflow_armed: true,
            scenario_id: None,
        }
    }

    /// Splits `self` into the interpreter and the context it works on.
    fn split(&mut self) -> (&mut CommandInterpreter, DskyContext<'_>) {
        let ctx = DskyContext {
            flight: &mut self.flight,
            indicators: &mut self.indicators,
            log: &mut self.log,
            directives: &mut self.directives,
            elapsed_secs: self.clock.elapsed_secs(),
        };
        (&mut self.interpreter, ctx)
    }

    /// Starts a fresh mission from `scenario`.
    ///
    /// Flight state, display, lamps, pending confirmations and the mission clock are all
    /// reset; the scenario's events are copied so the template itself is never marked.
    /// The mission log keeps its history.
    pub fn load_scenario(&mut self, scenario: &Scenario, now: DateTime<Utc>) {
        let init = scenario.initial_state();
        self.flight.reset(init.flight_state());
        self.interpreter.reset(init.command_state());
        self.indicators = IndicatorSet::initial();
        self.events = EventEngine::arm(scenario.events());
        self.clock.start(now, init.mission_time.unwrap_or(0));
        self.pending_dt = 0.0;
        self.latched.clear();
        self.deferred_clears.clear();
        self.exec_overflow_armed = true;
        self.scenario_id = Some(scenario.id().to_string());
        info!("Loaded scenario {} ({} events)", scenario.id(), scenario.events().len());
        self.ground_message(format!("MISSION LOADED: {}", scenario.name()));
        if let Some(excerpt) = scenario.description_excerpt() {
            self.ground_message(excerpt);
        }
    }

    /// Validates and loads a scenario given as JSON. On error nothing changes.
    pub fn load_scenario_json(&mut self, json: &str, now: DateTime<Utc>) -> Result<Scenario, ScenarioError> {
        let scenario = Scenario::from_json(json).inspect_err(|e| warn!("Scenario rejected: {e}"))?;
        self.load_scenario(&scenario, now);
        Ok(scenario)
    }

    pub fn handle_key(&mut self, key: Key) {
        let (interpreter, mut ctx) = self.split();
        interpreter.handle_key(key, &mut ctx);
    }

    /// Advances the mission by `dt` seconds of wall time.
    ///
    /// Time is accumulated until at least [`Self::MIN_STEP`] is due and integrated in a
    /// single step of at most [`Self::MAX_STEP`]. Per accepted step the flight model runs,
    /// then the scenario events, then the ground rule, the built-in 1202 alarm, indicator
    /// derivation and register refresh. Negative or non-finite `dt` is ignored.
    ///
    /// # Returns
    /// Whether a step was taken.
    pub fn advance(&mut self, dt: f64) -> bool {
        if !dt.is_finite() || dt <= 0.0 {
            return false;
        }
        self.pending_dt += dt;
        if self.pending_dt < Self::MIN_STEP {
            return false;
        }
        let step = self.pending_dt.min(Self::MAX_STEP);
        self.pending_dt = 0.0;

        let was_active = self.flight.is_active();
        let report = self.flight.step(step);
        if was_active {
            self.apply_events();
        }
        if report.ground_contact {
            if self.flight.is_active() {
                let outcome = self.flight.resolve_ground_contact();
                self.report_ground_contact(outcome);
            } else {
                self.flight.settle_on_ground();
            }
        }
        if self.flight.is_active() {
            self.check_exec_overflow();
            if !self.interpreter.lamp_test_active() {
                let program = self.interpreter.command_state().program;
                self.indicators = self.indicators.derive(program, &self.flight.state());
            }
        }
        let flight = self.flight.state();
        self.interpreter.refresh_registers(&flight, self.clock.elapsed_secs());
        true
    }

    fn apply_events(&mut self) {
        for effect in self.events.evaluate(&self.flight.state()) {
            match effect {
                EventEffect::Alarm { code, message } => {
                    let (interpreter, mut ctx) = self.split();
                    interpreter.raise_alarm(&code, message.as_deref(), &mut ctx);
                }
                EventEffect::Success { message } => {
                    self.flight.halt();
                    self.terminal(message.as_deref().unwrap_or("MISSION SUCCESS"), IndicatorName::UplinkActy);
                }
                EventEffect::Fail { message } => {
                    self.flight.halt();
                    self.terminal(message.as_deref().unwrap_or("MISSION FAILURE"), IndicatorName::OprErr);
                }
            }
        }
    }

    /// Raises the built-in 1202 alarm on a fast, low descent. It fires once per entry into
    /// that envelope and waits while another alarm holds the display.
    fn check_exec_overflow(&mut self) {
        let flight = self.flight.state();
        if flight.altitude >= Self::EXEC_OVERFLOW_ALTITUDE || flight.velocity >= Self::EXEC_OVERFLOW_VELOCITY {
            self.exec_overflow_armed = true;
            return;
        }
        if !self.exec_overflow_armed || self.interpreter.command_state().priority_lock {
            return;
        }
        self.exec_overflow_armed = false;
        let (interpreter, mut ctx) = self.split();
        interpreter.lock_alarm(Self::EXEC_OVERFLOW_CODE, &mut ctx);
        ctx.ground("ALARM 1202 DETECTED. EXEC OVERFLOW.");
    }

    fn report_ground_contact(&mut self, outcome: GroundOutcome) {
        match outcome {
            GroundOutcome::Crash { impact_velocity } => {
                self.terminal(&format!("CRASH. VEL: {impact_velocity:.1} M/S"), IndicatorName::OprErr);
            }
            GroundOutcome::Touchdown { .. } => self.terminal("TOUCHDOWN. ENGINE STOP.", IndicatorName::UplinkActy),
        }
    }

    /// Logs a mission outcome and latches its lamp. No flash is scheduled, so the lamp
    /// stays lit until the next load or RSET.
    fn terminal(&mut self, message: &str, lamp: IndicatorName) {
        info!("Mission ended: {message}");
        self.log.push(Role::Ground, message);
        self.indicators.set(lamp, true);
        self.latched.push(lamp);
    }

    /// Appends a ground message (advisory answers, import notices), flashing UPLINK ACTY.
    pub fn ground_message(&mut self, message: impl Into<String>) {
        let (_, mut ctx) = self.split();
        ctx.ground(message);
    }

    /// Switches off a lamp whose flash has expired.
    pub fn clear_indicator(&mut self, name: IndicatorName) {
        if self.latched.contains(&name) {
            return;
        }
        if self.interpreter.lamp_test_active() {
            event!("Flash end of {name} deferred until the lamp test ends");
            self.deferred_clears.push(name);
            return;
        }
        self.indicators.set(name, false);
    }

    /// Restores the display captured by `snapshot`, then applies flash expiries that
    /// were held back during the test.
    pub fn end_lamp_test(&mut self, snapshot: LampTestSnapshot) {
        self.interpreter.end_lamp_test(snapshot, &mut self.indicators);
        if self.interpreter.lamp_test_active() {
            return;
        }
        for name in std::mem::take(&mut self.deferred_clears) {
            self.indicators.set(name, false);
        }
        for lamp in &self.latched {
            self.indicators.set(*lamp, true);
        }
    }

    /// Updates the mission clock from wall time.
    pub fn tick_clock(&mut self, now: DateTime<Utc>) { self.clock.tick(now); }

    /// Hands over every directive queued since the last call.
    pub fn take_directives(&mut self) -> Vec<Directive> { std::mem::take(&mut self.directives) }

    pub fn command_state(&self) -> &CommandState { self.interpreter.command_state() }
    pub fn flight_state(&self) -> FlightState { self.flight.state() }
    pub fn indicators(&self) -> &IndicatorSet { &self.indicators }
    pub fn log(&self) -> &MissionLog { &self.log }
    pub fn clock(&self) -> &MissionClock { &self.clock }
    pub fn interpreter_state(&self) -> InterpreterState { self.interpreter.state() }
    pub fn pending(&self) -> Option<PendingConfirmation> { self.interpreter.pending() }
    pub fn scenario_id(&self) -> Option<&str> { self.scenario_id.as_deref() }
    pub fn events(&self) -> &EventEngine { &self.events }
}

impl Default for GuidanceComputer {
    fn default() -> Self { Self::new() }
}
