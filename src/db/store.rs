// src/db/store.rs

use async_trait::async_trait;

use crate::{
    common::error::AppError,
    db::{
        EmployeeRepository, NotificationRepository, ReservationRepository, RideRepository,
        StatsRepository,
    },
};

/// Uma transação lógica sobre todos os repositórios.
///
/// Tudo que for escrito só passa a valer em `commit`. Se o valor for
/// descartado antes disso (erro no meio do caminho, `?`, panic), nenhuma
/// escrita sobrevive: reserva, contadores da carona e notificações voltam
/// juntos.
#[async_trait]
pub trait UnitOfWork:
    EmployeeRepository
    + RideRepository
    + ReservationRepository
    + NotificationRepository
    + StatsRepository
    + Send
{
    async fn commit(self: Box<Self>) -> Result<(), AppError>;
}

/// O armazenamento lógico único da aplicação (Postgres ou memória).
#[async_trait]
pub trait Datastore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError>;

    fn backend_name(&self) -> &'static str;
}
