// src/services/ride_locks.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::common::error::AppError;

type LockTable = Arc<Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>;

fn poisoned<T>(_: T) -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("ride lock table poisoned"))
}

/// Uma trava exclusiva por carona.
///
/// Toda operação que lê e depois escreve `available_seats`/`status` de uma
/// carona (pedido, aprovação, rejeição, cancelamento, exclusão de reserva,
/// edição/conclusão/exclusão da carona) segura esta trava do início ao commit.
/// Operações em caronas diferentes não se bloqueiam.
///
/// A entrada só existe enquanto alguém segura ou espera a trava: o último
/// `RideGuard` a sair remove a entrada da tabela.
#[derive(Clone, Default)]
pub struct RideLocks {
    locks: LockTable,
}

impl RideLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, ride_id: Uuid) -> Result<RideGuard, AppError> {
        // O mapa só é travado para buscar/criar a entrada, nunca durante o .await
        let lock = {
            let mut locks = self.locks.lock().map_err(poisoned)?;
            Arc::clone(locks.entry(ride_id).or_default())
        };

        // Montado antes do .await: se a espera for cancelada, o Drop ainda limpa a entrada
        let mut ride_guard = RideGuard {
            guard: None,
            lock,
            table: Arc::clone(&self.locks),
            ride_id,
        };
        ride_guard.guard = Some(Arc::clone(&ride_guard.lock).lock_owned().await);
        Ok(ride_guard)
    }

    #[cfg(test)]
    pub(crate) fn tracked(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or_default()
    }
}

pub struct RideGuard {
    guard: Option<OwnedMutexGuard<()>>,
    lock: Arc<AsyncMutex<()>>,
    table: LockTable,
    ride_id: Uuid,
}

impl Drop for RideGuard {
    fn drop(&mut self) {
        // Libera a trava antes de olhar a tabela
        self.guard.take();

        let Ok(mut locks) = self.table.lock() else {
            return;
        };
        // Referências restantes: a da tabela e esta. Mais que isso = alguém esperando.
        let idle = locks
            .get(&self.ride_id)
            .is_some_and(|entry| Arc::ptr_eq(entry, &self.lock) && Arc::strong_count(&self.lock) == 2);
        if idle {
            locks.remove(&self.ride_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn same_ride_is_serialized() {
        let locks = RideLocks::new();
        let ride_id = Uuid::new_v4();
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let inside = Arc::clone(&inside);
            let max_seen = Arc::clone(&max_seen);
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(ride_id).await.unwrap();
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_rides_do_not_block_each_other() {
        let locks = RideLocks::new();
        let _first = locks.acquire(Uuid::new_v4()).await.unwrap();
        let second = tokio::time::timeout(Duration::from_millis(100), locks.acquire(Uuid::new_v4())).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn released_locks_leave_no_entries() {
        let locks = RideLocks::new();
        for _ in 0..100 {
            let _guard = locks.acquire(Uuid::new_v4()).await.unwrap();
        }
        assert_eq!(locks.tracked(), 0);

        let ride_id = Uuid::new_v4();
        let first = locks.acquire(ride_id).await.unwrap();
        assert_eq!(locks.tracked(), 1);
        drop(first);
        assert_eq!(locks.tracked(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn entry_survives_while_someone_waits() {
        let locks = RideLocks::new();
        let ride_id = Uuid::new_v4();
        let held = locks.acquire(ride_id).await.unwrap();

        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(ride_id).await.unwrap();
                release_rx.await.ok();
            })
        };
        // Dá tempo do waiter entrar na fila
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(held);
        assert_eq!(locks.tracked(), 1);

        release_tx.send(()).unwrap();
        waiter.await.unwrap();
        assert_eq!(locks.tracked(), 0);
    }

    #[tokio::test]
    async fn cancelled_wait_leaves_no_entry() {
        let locks = RideLocks::new();
        let ride_id = Uuid::new_v4();
        let held = locks.acquire(ride_id).await.unwrap();

        let waited = tokio::time::timeout(Duration::from_millis(20), locks.acquire(ride_id)).await;
        assert!(waited.is_err());

        drop(held);
        assert_eq!(locks.tracked(), 0);
    }
}
