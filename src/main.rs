// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Trackbot firmware entry point.
//!
//! Brings up clocks, pins and peripherals, wires the interrupt handlers to the shared
//! [`RobotContext`], registers the tasks and hands control to the scheduler.

#![cfg_attr(target_os = "none", no_std, no_main)]

#[cfg(target_os = "none")]
mod app {
    use core::cell::RefCell;
    use core::sync::atomic::{AtomicU32, Ordering};

    use cortex_m::peripheral::{syst::SystClkSource, NVIC};
    use cortex_m_rt::{entry, exception};
    use critical_section::Mutex;
    use defmt_rtt as _;
    use panic_halt as _;

    use stm32f7xx_hal::{
        pac::{self, interrupt},
        prelude::*,
        serial::{Config, Serial},
    };

    use trackbot::{
        config::{
            priority, MotionConfig, COMMAND_RX_LEN, ENCODER_SAMPLE_TICKS, MAX_PWM, OS_MAX_TASKS,
            OS_TICK_MS, TELEMETRY_RX_LEN,
        },
        context::RobotContext,
        control::RamGainStore,
        drivers::{DifferentialDrive, Led, Tb6612, WheelSpeedEstimator},
        hw::{BoardPins, ByteReceiver, Encoder, LineReceiver, Tim4Pwm, Usart},
        log_info, log_warn,
        os::{Scheduler, Task, TaskTable},
        tasks::{CommandTask, DisplayTask, LedTask, MotionTask, TelemetryTask},
    };

    /// Core and APB1 timer clock after reset (HSI, no PLL).
    const CORE_CLOCK_HZ: u32 = 16_000_000;

    /// H-bridge PWM frequency request; limited by the timer clock.
    const PWM_FREQ_HZ: u32 = 10_000;

    const BAUD_DEBUG: u32 = 115_200;
    const BAUD_WIFI: u32 = 115_200;
    const BAUD_GPS: u32 = 9_600;
    const BAUD_VISION: u32 = 115_200;

    static ROBOT: RobotContext = RobotContext::new();
    static OS: TaskTable<OS_MAX_TASKS> = TaskTable::new();

    static COMMAND_RX: Mutex<RefCell<LineReceiver<pac::USART2, COMMAND_RX_LEN>>> =
        Mutex::new(RefCell::new(LineReceiver::new()));
    static TELEMETRY_RX: Mutex<RefCell<LineReceiver<pac::USART3, TELEMETRY_RX_LEN>>> =
        Mutex::new(RefCell::new(LineReceiver::new()));
    static VISION_RX: ByteReceiver<pac::USART6> = ByteReceiver::new();

    static ENCODERS: Mutex<RefCell<Option<(Encoder<pac::TIM3>, Encoder<pac::TIM5>)>>> =
        Mutex::new(RefCell::new(None));
    static UPTIME_TICKS: AtomicU32 = AtomicU32::new(0);

    #[entry]
    fn main() -> ! {
        // Peripherals
        let dp = pac::Peripherals::take().unwrap();
        let cp = cortex_m::Peripherals::take().unwrap();

        // Timer clocks: TIM3/TIM5 encoders, TIM4 PWM
        dp.RCC
            .apb1enr
            .modify(|_, w| w.tim3en().set_bit().tim4en().set_bit().tim5en().set_bit());

        // Clocks
        let rcc = dp.RCC.constrain();
        let clocks = rcc.cfgr.freeze();

        // GPIO
        let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOC, dp.GPIOD);

        // USARTs
        let usart_cfg = |baud: u32| Config {
            baud_rate: baud.bps(),
            ..Default::default()
        };
        let debug = Usart::new(Serial::new(
            dp.USART1,
            (pins.usart1.tx, pins.usart1.rx),
            &clocks,
            usart_cfg(BAUD_DEBUG),
        ));
        let _wifi = Serial::new(
            dp.USART2,
            (pins.usart2.tx, pins.usart2.rx),
            &clocks,
            usart_cfg(BAUD_WIFI),
        );
        let _gps = Serial::new(
            dp.USART3,
            (pins.usart3.tx, pins.usart3.rx),
            &clocks,
            usart_cfg(BAUD_GPS),
        );
        let _vision = Serial::new(
            dp.USART6,
            (pins.usart6.tx, pins.usart6.rx),
            &clocks,
            usart_cfg(BAUD_VISION),
        );

        // Encoders
        let _encoder_pins = pins.encoder;
        let encoders = (Encoder::tim3(dp.TIM3), Encoder::tim5(dp.TIM5));
        critical_section::with(|cs| ENCODERS.borrow_ref_mut(cs).replace(encoders));

        // H-bridge
        let _pwm_pins = (pins.drive.pwm_a, pins.drive.pwm_b);
        let (pwm_a, pwm_b) = Tim4Pwm::new(dp.TIM4, CORE_CLOCK_HZ, PWM_FREQ_HZ, MAX_PWM).split();
        let mut stby = pins.drive.stby;
        stby.set_high();
        let drive = DifferentialDrive::new(
            Tb6612::new(pins.drive.ain1, pins.drive.ain2, pwm_a, MAX_PWM),
            Tb6612::new(pins.drive.bin1, pins.drive.bin2, pwm_b, MAX_PWM),
        );

        // LEDs
        let heartbeat = Led::active_low(pins.leds.heartbeat);
        let mode_led = Led::active_low(pins.leds.mode);

        // Tasks
        let mut motion = MotionTask::new(
            &ROBOT,
            drive,
            RamGainStore::blank(),
            MotionConfig::default(),
        );
        let mut command = CommandTask::new(&ROBOT);
        let mut telemetry = TelemetryTask::new(&ROBOT);
        let mut display = DisplayTask::new(&ROBOT, debug);
        let mut leds = LedTask::new(&ROBOT, heartbeat, mode_led);

        let mut scheduler = Scheduler::new(&OS);
        let tasks: [(&mut dyn Task, u8, &str); 5] = [
            (&mut motion, priority::MOTION, "motion"),
            (&mut command, priority::COMMAND, "command"),
            (&mut telemetry, priority::TELEMETRY, "telemetry"),
            (&mut display, priority::DISPLAY, "display"),
            (&mut leds, priority::LED, "led"),
        ];
        for (task, prio, name) in tasks {
            if let Err(e) = scheduler.register(task, prio) {
                log_warn!("{} task not started: {}", name, e);
            }
        }

        // Receive interrupts
        critical_section::with(|cs| {
            COMMAND_RX.borrow_ref_mut(cs).listen();
            TELEMETRY_RX.borrow_ref_mut(cs).listen();
        });
        VISION_RX.listen();
        unsafe {
            NVIC::unmask(pac::Interrupt::USART2);
            NVIC::unmask(pac::Interrupt::USART3);
            NVIC::unmask(pac::Interrupt::USART6);
        }

        // Scheduler tick
        let mut syst = cp.SYST;
        syst.set_clock_source(SystClkSource::Core);
        syst.set_reload(CORE_CLOCK_HZ / 1000 * OS_TICK_MS - 1);
        syst.clear_current();
        syst.enable_counter();
        syst.enable_interrupt();

        log_info!("trackbot up, {} tasks", scheduler.len());
        scheduler.run()
    }

    #[exception]
    fn SysTick() {
        OS.tick();

        let now = UPTIME_TICKS.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        if now % ENCODER_SAMPLE_TICKS == 0 {
            critical_section::with(|cs| {
                if let Some((left, right)) = ENCODERS.borrow_ref_mut(cs).as_mut() {
                    WheelSpeedEstimator::default().publish(
                        &ROBOT.speeds,
                        left.take_delta(),
                        right.take_delta(),
                    );
                }
            });
        }
    }

    #[interrupt]
    fn USART2() {
        critical_section::with(|cs| {
            COMMAND_RX
                .borrow_ref_mut(cs)
                .on_interrupt(&ROBOT.command_rx)
        });
    }

    #[interrupt]
    fn USART3() {
        critical_section::with(|cs| {
            TELEMETRY_RX
                .borrow_ref_mut(cs)
                .on_interrupt(&ROBOT.telemetry_rx)
        });
    }

    #[interrupt]
    fn USART6() {
        VISION_RX.on_interrupt(&ROBOT.vision);
    }
}

#[cfg(not(target_os = "none"))]
fn main() {}
