#![no_std]
#![no_main]

#[cfg(feature = "defmt")]
use defmt_rtt as _;

// RISC-V runtime
use riscv_rt as _;

// Panic handler
#[cfg(not(feature = "defmt"))]
use panic_halt as _;
#[cfg(feature = "defmt")]
use panic_probe as _;

use embassy_executor::Spawner;
use embassy_time::Duration;

use morse_firmware::*;

/// Main firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    #[cfg(feature = "defmt")]
    defmt::info!("Morse decoder firmware starting...");

    let hal = init_global_hal();

    let config = match default_config().validate() {
        Ok(()) => default_config(),
        Err(_error) => {
            #[cfg(feature = "defmt")]
            defmt::error!("Invalid decoder config: {:?}", _error);
            DecoderConfig::DEFAULT
        }
    };
    #[cfg(feature = "defmt")]
    defmt::info!(
        "Decoder config: {} WPM, unit {} ms, debounce {} ms",
        config.wpm(),
        config.timing.unit.as_millis(),
        config.debounce.as_millis()
    );

    spawner.must_spawn(decoder_task_wrapper(hal, config));
    spawner.must_spawn(tone_task());

    #[cfg(feature = "defmt")]
    defmt::info!("Decoder firmware ready");

    // Main supervision loop
    loop {
        embassy_time::Timer::after(Duration::from_secs(1)).await;
        #[cfg(feature = "defmt")]
        defmt::trace!("Heartbeat");
    }
}
