//! ADC capture firmware - Main Entry Point
//!
//! Hardware-only entry point: one capture-then-transfer cycle, then halt.
//! Progress and failures are reported over defmt-RTT.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt_rtt as _;
// Panic handler
use panic_probe as _;

use firmware::board::{self, HARDWARE};
use firmware::drivers::{AxiDma, PwmCore, SysMon};
use firmware::registers::Mmio;
use firmware::{
    initialize_actuator, initialize_analog_front_end, initialize_transfer_engine, read_health,
    run_cycle, CyclePeripherals, DwtTimer, ScbCache,
};
use platform::config::CURRENT_SENSOR_PWM_COUNTER_MAX;
use platform::{CaptureConfig, DutyCycleOutput, StagingBuffer};

#[entry]
fn main() -> ! {
    defmt::info!("ADC capture firmware v{=str}", env!("CARGO_PKG_VERSION"));

    let Some(mut cp) = cortex_m::Peripherals::take() else {
        defmt::error!("core peripherals already taken");
        halt();
    };
    cp.SCB.enable_icache();
    cp.SCB.enable_dcache(&mut cp.CPUID);

    let config = CaptureConfig::current_sensor();
    let pwm_counter_max = config
        .actuator
        .map_or(CURRENT_SENSOR_PWM_COUNTER_MAX, |a| a.counter_max);

    // Step 1: bootstrap. Every base address comes from the hardware table.
    let mut front_end = match initialize_analog_front_end(&HARDWARE, board::SYSMON_DEVICE_ID, |base| {
        // SAFETY: `base` is the system monitor block from the board table; the
        // handle is the only one created for it.
        SysMon::configure(unsafe { Mmio::new(base) })
    }) {
        Ok(f) => f,
        Err(e) => fail(e),
    };

    let mut pwm = match initialize_actuator(&HARDWARE, board::PWM_DEVICE_ID, |base| {
        // SAFETY: PWM core block from the board table, single handle.
        PwmCore::configure(unsafe { Mmio::new(base) }, pwm_counter_max)
    }) {
        Ok(p) => p,
        Err(e) => fail(e),
    };

    // Step 2: engine reset happens inside bootstrap.
    let mut engine = match initialize_transfer_engine(&HARDWARE, board::DMA_DEVICE_ID, |base| {
        // SAFETY: transfer engine block from the board table, single handle.
        AxiDma::configure(unsafe { Mmio::new(base) })
    }) {
        Ok(e) => e,
        Err(e) => fail(e),
    };

    read_health(&mut front_end);

    let mut cache = ScbCache::new(cp.SCB);
    let mut timer = DwtTimer::new(&mut cp.DCB, cp.DWT, board::CPU_CLOCK_HZ);

    // SAFETY: the staging regions lie in the STAGING block of memory.x,
    // which no output section is assigned to, so nothing else in the image
    // refers to them.
    let mut buffer = unsafe { StagingBuffer::from_region(config.region) };

    let mut peripherals = CyclePeripherals {
        front_end: &mut front_end,
        engine: &mut engine,
        cache: &mut cache,
        timer: &mut timer,
        actuator: Some(&mut pwm as &mut dyn DutyCycleOutput),
        buffer: &mut buffer,
    };

    // Steps 3-10.
    match run_cycle(&mut peripherals, &config) {
        Ok(report) => defmt::info!(
            "done: {} samples ({}), {} bytes in {} polls",
            report.capture.sample_count,
            report.capture.stop_reason,
            report.transfer.length_bytes,
            report.transfer.polls
        ),
        Err(e) => fail(e),
    }

    halt();
}

fn fail<E: defmt::Format>(err: E) -> ! {
    defmt::error!("capture cycle failed: {}", err);
    halt();
}

fn halt() -> ! {
    loop {
        cortex_m::asm::bkpt();
    }
}
