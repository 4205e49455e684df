//! # Pool Acotado de Workers
//! src/workers/pool.rs
//!
//! Arena fija de N slots. Cada slot puede tener a lo sumo un thread
//! handler; la tabla de slots solo se modifica bajo el mutex del pool.
//!
//! ```text
//!            acquire()             start()
//! Available ──────────▶ Reserved ──────────▶ Occupied(handle)
//!     ▲                                           │
//!     └──────────────── drain() ──────────────────┘
//! ```
//!
//! No hay cola: cuando todos los slots están ocupados el acceptor llama
//! a `drain()`, que espera a que terminen todos los handlers y libera el
//! pool completo de una vez.

use std::fmt;
use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{info, warn};

/// Identidad de un slot (índice 0..N-1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

impl SlotId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum PoolError {
    /// `acquire()` sin slots libres
    #[error("all {0} worker slots are occupied")]
    Saturated(usize),

    /// `start()` sobre un slot que no fue reservado
    #[error("{0} was not reserved")]
    NotReserved(SlotId),

    /// El sistema operativo no pudo crear el thread
    #[error("cannot spawn handler thread: {0}")]
    Spawn(#[source] io::Error),
}

/// Estado de un slot
enum SlotState {
    Available,
    Reserved,
    Occupied(JoinHandle<()>),
}

struct WorkerSlot {
    state: SlotState,
}

impl WorkerSlot {
    fn is_available(&self) -> bool {
        matches!(self.state, SlotState::Available)
    }
}

/// Estado protegido por el mutex
struct PoolState {
    slots: Vec<WorkerSlot>,
    /// Handlers que todavía están ejecutando
    running: usize,
    /// Máximo de handlers simultáneos observado
    peak_running: usize,
}

struct PoolInner {
    state: Mutex<PoolState>,
    /// Se notifica cada vez que un handler termina
    finished: Condvar,
    capacity: usize,
}

impl PoolInner {
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Decrementa `running` al salir del handler, aunque entre en pánico
struct RunningGuard {
    inner: Arc<PoolInner>,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        let mut state = self.inner.lock();
        state.running -= 1;
        self.inner.finished.notify_all();
    }
}

/// Pool de N slots de ejecución
pub struct WorkerPool {
    inner: Arc<PoolInner>,
}

impl WorkerPool {
    /// Crea un pool con `capacity` slots, todos disponibles
    ///
    /// # Panics
    ///
    /// Si `capacity` es 0 (la configuración lo valida antes).
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "worker pool needs at least one slot");

        let slots = (0..capacity)
            .map(|_| WorkerSlot { state: SlotState::Available })
            .collect();

        Self {
            inner: Arc::new(PoolInner {
                state: Mutex::new(PoolState {
                    slots,
                    running: 0,
                    peak_running: 0,
                }),
                finished: Condvar::new(),
                capacity,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Reserva el primer slot disponible
    ///
    /// El llamador debe haber verificado capacidad con `is_saturated()` o
    /// haber drenado el pool; si no hay slot libre retorna `Saturated`.
    pub fn acquire(&self) -> Result<SlotId, PoolError> {
        let mut state = self.inner.lock();

        let index = state
            .slots
            .iter()
            .position(WorkerSlot::is_available)
            .ok_or(PoolError::Saturated(self.inner.capacity))?;

        state.slots[index].state = SlotState::Reserved;
        let slot = SlotId(index);
        info!(%slot, "request will be handled by {}", slot);
        Ok(slot)
    }

    /// Arranca `job` en un thread propio ocupando `slot`
    pub fn start<F>(&self, slot: SlotId, job: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut state = self.inner.lock();

            match state.slots.get(slot.index()).map(|s| &s.state) {
                Some(SlotState::Reserved) => {}
                _ => return Err(PoolError::NotReserved(slot)),
            }

            state.running += 1;
            state.peak_running = state.peak_running.max(state.running);
        }

        // El spawn ocurre sin el lock: si falla, el closure se descarta y
        // el guard necesita tomar el mutex para decrementar `running`.
        let guard = RunningGuard {
            inner: Arc::clone(&self.inner),
        };
        let spawned = thread::Builder::new().name(slot.to_string()).spawn(move || {
            let _guard = guard;
            job();
        });

        let mut state = self.inner.lock();
        match spawned {
            Ok(handle) => {
                state.slots[slot.index()].state = SlotState::Occupied(handle);
                Ok(())
            }
            Err(e) => {
                state.slots[slot.index()].state = SlotState::Available;
                Err(PoolError::Spawn(e))
            }
        }
    }

    /// `acquire()` + `start()`
    pub fn dispatch<F>(&self, job: F) -> Result<SlotId, PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        let slot = self.acquire()?;
        self.start(slot, job)?;
        Ok(slot)
    }

    /// ¿Están todos los slots ocupados?
    pub fn is_saturated(&self) -> bool {
        let state = self.inner.lock();
        state.slots.iter().all(|slot| !slot.is_available())
    }

    /// Slots no disponibles (reservados u ocupados)
    pub fn occupied(&self) -> usize {
        let state = self.inner.lock();
        state.slots.iter().filter(|slot| !slot.is_available()).count()
    }

    /// Handlers ejecutando en este momento
    pub fn running(&self) -> usize {
        self.inner.lock().running
    }

    /// Máximo de handlers simultáneos desde que se creó el pool
    pub fn peak_running(&self) -> usize {
        self.inner.lock().peak_running
    }

    /// Espera a que terminen todos los handlers y libera todos los slots
    ///
    /// Retorna cuántos slots ocupados se recuperaron.
    pub fn drain(&self) -> usize {
        let handles: Vec<JoinHandle<()>> = {
            let mut state = self.inner.lock();
            info!(running = state.running, "worker pool full, waiting for all handlers");

            while state.running > 0 {
                state = self
                    .inner
                    .finished
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }

            state
                .slots
                .iter_mut()
                .filter_map(|slot| match std::mem::replace(&mut slot.state, SlotState::Available) {
                    SlotState::Occupied(handle) => Some(handle),
                    // Un slot reservado sin arrancar no tiene thread
                    SlotState::Reserved | SlotState::Available => None,
                })
                .collect()
        };

        let reclaimed = handles.len();
        for handle in handles {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            if handle.join().is_err() {
                warn!(worker = %name, "handler thread panicked");
            }
        }

        reclaimed
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if self.occupied() > 0 {
            self.drain();
        }
    }
}
