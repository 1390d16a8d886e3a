use super::guidance_computer::GuidanceComputer;
use super::mission_log::Role;
use crate::advisory::{Advisor, request_guidance};
use crate::config::Config;
use crate::dsky::dictionary::program_name;
use crate::dsky::{Directive, IndicatorName, Key, LampTestSnapshot};
use crate::scenario::{ImportOutcome, Scenario, ScenarioCatalog};
use crate::{error, ground, info, log, warn};
use chrono::Utc;
use futures::StreamExt;
use std::ops::ControlFlow;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tokio_util::time::DelayQueue;

/// A timed reset requested by the kernel.
#[derive(Debug)]
enum ScheduledReset {
    Indicator(IndicatorName),
    LampTest(LampTestSnapshot),
}

/// Host of the [`GuidanceComputer`].
///
/// Serializes physics ticks, console input, scheduled resets and advisory answers onto one
/// task, so the kernel is never touched concurrently. Advisory calls are the only work
/// spawned off that task.
pub struct Supervisor {
    kernel: GuidanceComputer,
    catalog: ScenarioCatalog,
    advisor: Arc<dyn Advisor>,
    frame_period: Duration,
    advisory_timeout: Duration,
    /// Mission-log entries already echoed to the console.
    printed: usize,
}

impl Supervisor {
    /// Interval of the mission clock and the status line.
    const CLOCK_INTERVAL: Duration = Duration::from_secs(1);
    /// Capacity of the advisory answer channel.
    const ADVISORY_CHANNEL: usize = 16;

    pub fn new(kernel: GuidanceComputer, catalog: ScenarioCatalog, advisor: Arc<dyn Advisor>, config: &Config) -> Self {
        Self {
            kernel,
            catalog,
            advisor,
            frame_period: config.frame_period,
            advisory_timeout: config.advisory_timeout,
            printed: 0,
        }
    }

    /// Runs the host loop until `:quit` or Ctrl-C.
    pub async fn run(mut self) {
        let shutdown = CancellationToken::new();
        let ctrl_c_token = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ctrl_c_token.cancel();
            }
        });

        let (adv_tx, mut adv_rx) = mpsc::channel::<String>(Self::ADVISORY_CHANNEL);
        let mut resets: DelayQueue<ScheduledReset> = DelayQueue::new();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        let mut frame = interval(self.frame_period);
        frame.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut clock = interval(Self::CLOCK_INTERVAL);
        let mut last_frame = Instant::now();

        self.print_new_log();
        info!("Host loop running, {}ms frames. Type keys (e.g. V37N63E, P) or :list, :quit", self.frame_period.as_millis());
        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    info!("Interrupted, shutting down");
                    break;
                }
                _ = frame.tick() => {
                    let now = Instant::now();
                    self.kernel.advance((now - last_frame).as_secs_f64());
                    last_frame = now;
                }
                _ = clock.tick() => {
                    self.kernel.tick_clock(Utc::now());
                    self.print_status();
                }
                line = lines.next_line(), if stdin_open => match line {
                    Ok(Some(line)) => {
                        if self.handle_line(&line).is_break() {
                            break;
                        }
                    }
                    Ok(None) => {
                        info!("Console input closed, simulation keeps running");
                        stdin_open = false;
                    }
                    Err(e) => {
                        error!("Console read failed: {e}");
                        stdin_open = false;
                    }
                },
                Some(expired) = resets.next(), if !resets.is_empty() => self.apply_reset(expired.into_inner()),
                Some(text) = adv_rx.recv() => self.kernel.ground_message(text),
            }
            self.dispatch_directives(&mut resets, &adv_tx);
            self.print_new_log();
        }
    }

    /// Schedules resets and spawns advisory requests for every queued kernel directive.
    fn dispatch_directives(&mut self, resets: &mut DelayQueue<ScheduledReset>, adv_tx: &mpsc::Sender<String>) {
        for directive in self.kernel.take_directives() {
            match directive {
                Directive::Flash { indicator, duration } => {
                    resets.insert(ScheduledReset::Indicator(indicator), duration);
                }
                Directive::EndLampTest { duration, snapshot } => {
                    resets.insert(ScheduledReset::LampTest(snapshot), duration);
                }
                Directive::Advise(request) => {
                    let advisor = Arc::clone(&self.advisor);
                    let tx = adv_tx.clone();
                    let timeout = self.advisory_timeout;
                    tokio::spawn(async move {
                        let text = request_guidance(advisor.as_ref(), &request, timeout).await;
                        if tx.send(text).await.is_err() {
                            warn!("Advisory answer dropped, host loop has stopped");
                        }
                    });
                }
            }
        }
    }

    fn apply_reset(&mut self, reset: ScheduledReset) {
        match reset {
            ScheduledReset::Indicator(name) => self.kernel.clear_indicator(name),
            ScheduledReset::LampTest(snapshot) => self.kernel.end_lamp_test(snapshot),
        }
    }

    /// Handles one console line: either `:command [arg]` or a sequence of key tokens.
    fn handle_line(&mut self, line: &str) -> ControlFlow<()> {
        let line = line.trim();
        if line.is_empty() {
            return ControlFlow::Continue(());
        }
        if let Some(command) = line.strip_prefix(':') {
            let (name, arg) = command.split_once(char::is_whitespace).unwrap_or((command, ""));
            return self.handle_command(name, arg.trim());
        }
        match Key::parse_sequence(line) {
            Ok(keys) => keys.into_iter().for_each(|key| self.kernel.handle_key(key)),
            Err(e) => warn!("{e}"),
        }
        ControlFlow::Continue(())
    }

    fn handle_command(&mut self, name: &str, arg: &str) -> ControlFlow<()> {
        match name {
            "quit" | "q" => return ControlFlow::Break(()),
            "load" => match self.catalog.get(arg) {
                Ok(scenario) => self.kernel.load_scenario(scenario, Utc::now()),
                Err(e) => warn!("{e}"),
            },
            "import" => self.import(Path::new(arg)),
            "list" => {
                for scenario in self.catalog.list() {
                    let marker = if self.kernel.scenario_id() == Some(scenario.id()) { '*' } else { ' ' };
                    info!("{marker} {:<18} {}", scenario.id(), scenario.name());
                }
            }
            "status" => self.print_status(),
            other => warn!("Unknown command :{other}. Known: :load <id>, :import <path>, :list, :status, :quit"),
        }
        ControlFlow::Continue(())
    }

    /// Imports a scenario file into the catalog without loading it.
    pub fn import(&mut self, path: &Path) {
        match Scenario::from_file(path) {
            Ok(scenario) => {
                let name = scenario.name().to_string();
                let id = scenario.id().to_string();
                if self.catalog.import(scenario) == ImportOutcome::Replaced {
                    info!("Scenario {id} replaced by import");
                }
                self.kernel.ground_message(format!("SCENARIO IMPORTED: {name}"));
            }
            Err(e) => error!("Import of {} refused: {e}", path.display()),
        }
    }

    fn print_new_log(&mut self) {
        for entry in self.kernel.log().since(self.printed) {
            match entry.role {
                Role::Ground => ground!("{}", entry.message),
                Role::Operator => log!("{}", entry.message),
            }
        }
        self.printed = self.kernel.log().len();
    }

    fn print_status(&self) {
        let flight = self.kernel.flight_state();
        let lamps: Vec<String> = self.kernel.indicators().lit().map(|l| l.to_string()).collect();
        let program = self.kernel.command_state().program;
        info!(
            "GET {} | {} ({}, {}) | ALT {:.0} VEL {:.1} FUEL {:.1} THR {:.0}{} | {}",
            self.kernel.clock(),
            self.kernel.command_state(),
            program_name(program).unwrap_or("unlisted program"),
            self.kernel.interpreter_state(),
            flight.altitude,
            flight.velocity,
            flight.fuel,
            flight.thrust,
            if flight.active { "" } else { " (stopped)" },
            lamps.join(" ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::{FALLBACK_MESSAGE, OfflineAdvisor};
    use crate::mission_control::Role;

    fn supervisor() -> Supervisor {
        let catalog = ScenarioCatalog::builtin();
        let mut kernel = GuidanceComputer::new();
        kernel.load_scenario(catalog.get("orbit").unwrap(), Utc::now());
        Supervisor::new(kernel, catalog, Arc::new(OfflineAdvisor), &Config::default())
    }

    /// Applies every scheduled reset, letting the paused clock run forward.
    async fn drain(sv: &mut Supervisor, resets: &mut DelayQueue<ScheduledReset>) {
        while let Some(expired) = resets.next().await {
            sv.apply_reset(expired.into_inner());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_flashes_expire_through_delay_queue() {
        let mut sv = supervisor();
        let (adv_tx, mut adv_rx) = mpsc::channel(Supervisor::ADVISORY_CHANNEL);
        let mut resets = DelayQueue::new();

        assert!(sv.handle_line("V06N43E").is_continue());
        sv.dispatch_directives(&mut resets, &adv_tx);
        assert!(sv.kernel.indicators().get(IndicatorName::CompActy));
        assert!(sv.kernel.indicators().get(IndicatorName::UplinkActy));

        tokio::time::advance(Duration::from_millis(150)).await;
        let first = resets.next().await.unwrap().into_inner();
        assert!(matches!(first, ScheduledReset::Indicator(IndicatorName::CompActy)));
        sv.apply_reset(first);
        assert!(!sv.kernel.indicators().get(IndicatorName::CompActy));
        assert!(sv.kernel.indicators().get(IndicatorName::UplinkActy));

        let answer = adv_rx.recv().await.unwrap();
        assert_eq!(answer, FALLBACK_MESSAGE);
        sv.kernel.ground_message(answer);
        let last = sv.kernel.log().last().unwrap();
        assert_eq!((last.role, last.message.as_str()), (Role::Ground, FALLBACK_MESSAGE));

        sv.dispatch_directives(&mut resets, &adv_tx);
        drain(&mut sv, &mut resets).await;
        assert!(!sv.kernel.indicators().get(IndicatorName::UplinkActy));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lamp_test_restored_by_host() {
        let mut sv = supervisor();
        let (adv_tx, _adv_rx) = mpsc::channel(Supervisor::ADVISORY_CHANNEL);
        let mut resets = DelayQueue::new();
        sv.dispatch_directives(&mut resets, &adv_tx);
        drain(&mut sv, &mut resets).await;

        assert!(sv.handle_line("LAMP").is_continue());
        sv.dispatch_directives(&mut resets, &adv_tx);
        assert!(sv.kernel.indicators().get(IndicatorName::Restart));
        assert_eq!(sv.kernel.command_state().r1().to_string(), "+88888");

        drain(&mut sv, &mut resets).await;
        assert!(!sv.kernel.indicators().get(IndicatorName::Restart));
        assert!(!sv.kernel.indicators().get(IndicatorName::CompActy));
        assert!(sv.kernel.indicators().get(IndicatorName::Stby));
        assert_ne!(sv.kernel.command_state().r1().to_string(), "+88888");
    }

    #[test]
    fn test_quit_and_unknown_commands() {
        let mut sv = supervisor();
        assert!(sv.handle_line(":list").is_continue());
        assert!(sv.handle_line(":bogus").is_continue());
        assert!(sv.handle_line(":q").is_break());
    }
}
