//! Embassy time driver for CH32V203 driven by the SysTick counter

use embassy_time_driver::{AlarmHandle, Driver};
use portable_atomic::{AtomicU32, Ordering};

/// Tick counter advanced from the SysTick interrupt at `tick-hz-32_768`
pub struct SysTickTimeDriver {
    tick_count: AtomicU32,
}

impl SysTickTimeDriver {
    const fn new() -> Self {
        Self {
            tick_count: AtomicU32::new(0),
        }
    }

    /// Increment tick count (called from system timer interrupt)
    pub fn tick(&self) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
    }
}

impl Driver for SysTickTimeDriver {
    fn now(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed) as u64
    }

    unsafe fn allocate_alarm(&self) -> Option<AlarmHandle> {
        // Timers are served by the generic queue; the executor polls
        None
    }

    fn set_alarm_callback(&self, _alarm: AlarmHandle, _callback: fn(*mut ()), _ctx: *mut ()) {}

    fn set_alarm(&self, _alarm: AlarmHandle, _timestamp: u64) -> bool {
        false
    }
}

embassy_time_driver::time_driver_impl!(static DRIVER: SysTickTimeDriver = SysTickTimeDriver::new());

/// SysTick interrupt body
pub fn on_systick() {
    DRIVER.tick();
}

// Critical section implementation for single-core RISC-V
critical_section::set_impl!(RiscvCriticalSection);

struct RiscvCriticalSection;

unsafe impl critical_section::Impl for RiscvCriticalSection {
    unsafe fn acquire() -> u8 {
        #[cfg(target_arch = "riscv32")]
        {
            let mut mstatus: usize;
            core::arch::asm!("csrrci {}, mstatus, 8", out(reg) mstatus);
            (mstatus & 8) as u8
        }
        #[cfg(not(target_arch = "riscv32"))]
        {
            0
        }
    }

    unsafe fn release(was_active: u8) {
        #[cfg(target_arch = "riscv32")]
        if was_active != 0 {
            core::arch::asm!("csrsi mstatus, 8");
        }
        #[cfg(not(target_arch = "riscv32"))]
        let _ = was_active;
    }
}
