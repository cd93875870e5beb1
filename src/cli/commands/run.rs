use crate::config::Config;
use crate::core::reporter::Reporter;
use crate::core::shutdown;
use crate::core::station::Station;
use crate::devices::sim::{SimCamera, SimMagnetometer, SimPowerMeter, SimSwitch};
use crate::devices::{BoundedClock, Camera, Clock, CommandCamera, Devices, SystemClock};
use crate::errors::AppResult;
use crate::storage::{DayStore, OpLog};
use std::sync::Arc;

/// Handle the `run` command
///
/// Startup order:
///  - clock and operational log
///  - devices and the station controller (power meter configured + settled)
///  - signal handler, then the reporter thread
///  - the acquisition loop, until a signal or a fatal error
pub fn handle(cfg: &Config) -> AppResult<()> {
    let wall: Arc<dyn Clock> = Arc::new(SystemClock);
    let clock: Arc<dyn Clock> = Arc::new(BoundedClock::spawn(wall, cfg.device_timeout())?);

    let log = OpLog::open(cfg.log_path(), clock.clone())?;
    let store = DayStore::new(cfg.data_root());

    let devices = build_devices(cfg, &clock, &log);
    let mut station = Station::new(cfg, devices, clock.clone(), store.clone(), log.clone())?;

    let (trigger, shutdown) = shutdown::channel();
    ctrlc::set_handler(move || trigger.trigger())?;

    if !station.initialize(&shutdown) {
        log.info("Interrupted during initialization");
        return Ok(());
    }

    let reporter =
        Reporter::from_config(cfg, store, clock, log.clone()).spawn(cfg.report_interval())?;
    log.info(format!(
        "Acquisition started: window {}, batch {}, report every {}s",
        cfg.window()?,
        cfg.batch_size,
        cfg.report_interval_secs
    ));

    let result = station.run(&shutdown);
    reporter.stop();
    log.info("Reporter stopped");
    result
}

fn build_devices(cfg: &Config, clock: &Arc<dyn Clock>, log: &OpLog) -> Devices {
    let camera: Box<dyn Camera> = match CommandCamera::from_config(&cfg.camera) {
        Some(camera) => Box::new(camera),
        None => {
            log.warn("No camera command configured; using the simulated camera");
            Box::new(SimCamera)
        }
    };

    // No I2C drivers are bundled; INA226 / QMC5883 implementations plug in here.
    log.warn("Power meter and compass are simulated");
    Devices {
        meter: Box::new(SimPowerMeter::new(clock.clone(), cfg.max_expected_amps)),
        compass: Box::new(SimMagnetometer::new(clock.clone())),
        camera,
        relay: Box::new(SimSwitch::default()),
    }
}
