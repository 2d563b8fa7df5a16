#![no_std]
#![no_main]

use defmt::*;

use embassy_embedded_hal::shared_bus::asynch::spi::SpiDevice;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C0, SPI0};
use embassy_rp::spi::{self, Phase, Polarity, Spi};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Delay;
use embedded_hal::spi::{Phase as HalPhase, Polarity as HalPolarity};
use static_cell::StaticCell;

use {defmt_rtt as _, panic_probe as _};

use thermo_rig::indicator::Heartbeat;
use thermo_rig::mcp4725::init_i2c;
use thermo_rig::network::WifiStub;
use thermo_rig::relay::Relays;
use thermo_rig::{Config, Controller, DeviceManager};

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

type SpiBus = Spi<'static, SPI0, spi::Async>;

static SPI_BUS: StaticCell<Mutex<NoopRawMutex, SpiBus>> = StaticCell::new();

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Program start");
    let peripherals = embassy_rp::init(Default::default());
    let config = Config::default();

    // SPI bus shared by the ADC, potentiometer and cold junction sensor
    let mut spi_config = spi::Config::default();
    spi_config.frequency = config.spi.frequency;
    spi_config.polarity = match config.spi.mode.polarity {
        HalPolarity::IdleLow => Polarity::IdleLow,
        HalPolarity::IdleHigh => Polarity::IdleHigh,
    };
    spi_config.phase = match config.spi.mode.phase {
        HalPhase::CaptureOnFirstTransition => Phase::CaptureOnFirstTransition,
        HalPhase::CaptureOnSecondTransition => Phase::CaptureOnSecondTransition,
    };

    let sclk = peripherals.PIN_18;                               // Serial Clock
    let mosi = peripherals.PIN_19;                               // Master Out Slave In
    let miso = peripherals.PIN_16;                               // Master In Slave Out
    let converter_cs = Output::new(peripherals.PIN_12, Level::High);   // AD7193 + AD5201
    let thermometer_cs = Output::new(peripherals.PIN_17, Level::High); // ADT7320

    let spi = Spi::new(peripherals.SPI0, sclk, mosi, miso, peripherals.DMA_CH0, peripherals.DMA_CH1, spi_config);
    let bus = SPI_BUS.init(Mutex::new(spi));
    let converter = SpiDevice::new(bus, converter_cs);
    let thermometer = SpiDevice::new(bus, thermometer_cs);
    info!("SPI devices initialized.");

    // I2C: heater DAC, joypad, LCD
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = config.i2c_frequency;
    let mut i2c = I2c::new_async(peripherals.I2C0, peripherals.PIN_5, peripherals.PIN_4, Irqs, i2c_config);
    if let Err(e) = init_i2c(&mut i2c, &config.i2c).await {
        error!("I2C bring-up failed: {:?}", e);
    }

    let relays = Relays::new([
        Output::new(peripherals.PIN_7, Level::Low),
        Output::new(peripherals.PIN_8, Level::Low),
        Output::new(peripherals.PIN_9, Level::Low),
    ]);
    let led = Output::new(peripherals.PIN_15, Level::Low);

    let devices = DeviceManager::new(converter, thermometer, relays, Delay, config);
    let mut controller = Controller::new(devices, Heartbeat::new(led), WifiStub::new());

    match controller.run().await {
        Ok(never) => match never {},
        Err(e) => defmt::panic!("fatal: {:?}", e),
    }
}
