//! Wall-clock auto-step driver.
//!
//! A background thread stepping a shared simulator on a fixed cadence,
//! owning its own lifecycle. The engine itself performs no locking;
//! all access goes through the shared mutex, so at most one advance is ever
//! in flight. Stopping never interrupts an in-progress advance — it only
//! prevents future steps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::domain::candle::Candle;
use crate::domain::order::Order;
use crate::domain::simulator::Simulator;

pub struct AutoStepper {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl AutoStepper {
    /// Spawn a thread that advances the simulator by one candle every
    /// `interval`, invoking `on_candle` for each processed candle. The
    /// thread stops itself when the candle data runs out.
    pub fn start<F>(simulator: Arc<Mutex<Simulator>>, interval: Duration, mut on_candle: F) -> Self
    where
        F: FnMut(&Candle, &[Order]) + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            loop {
                thread::sleep(interval);
                if stop_flag.load(Ordering::Relaxed) {
                    break;
                }
                let Ok(mut sim) = simulator.lock() else {
                    break;
                };
                if !sim.advance_to_next_candle_with(&mut on_candle) {
                    // no more candles
                    break;
                }
            }
        });

        Self {
            handle: Some(handle),
            stop,
        }
    }

    /// Request shutdown and wait for the driver thread to finish.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Wait for the driver to drain the remaining candles and exit on its
    /// own.
    pub fn wait(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for AutoStepper {
    fn drop(&mut self) {
        self.stop();
    }
}
