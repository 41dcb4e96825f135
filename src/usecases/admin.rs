use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::repositories::cart::CartRepository;
use crate::domain::repositories::donations::DonationRepository;
use crate::domain::repositories::orders::OrderRepository;
use crate::domain::repositories::registrations::RegistrationRepository;
use crate::domain::value_objects::admin_reports::{
    AdminDonationDto, AdminOrderDto, CollectionSummaryDto, CollectionTotals, DashboardDto,
    DonationsOverviewDto, OrdersOverviewDto, PaidRegistrationDto,
};
use crate::domain::value_objects::dates;
use crate::domain::value_objects::money;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Order not found")]
    OrderNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AdminError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AdminError::OrderNotFound => StatusCode::NOT_FOUND,
            AdminError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Read-mostly admin reporting plus the few manual interventions
/// (force-approve, purge). Net amounts deduct the gateway's fixed fee rate.
pub struct AdminUseCase<R, O, D, C>
where
    R: RegistrationRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    D: DonationRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    registration_repo: Arc<R>,
    order_repo: Arc<O>,
    donation_repo: Arc<D>,
    cart_repo: Arc<C>,
    registration_amount_minor: i64,
    fee_rate: f64,
}

impl<R, O, D, C> AdminUseCase<R, O, D, C>
where
    R: RegistrationRepository + Send + Sync + 'static,
    O: OrderRepository + Send + Sync + 'static,
    D: DonationRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    pub fn new(
        registration_repo: Arc<R>,
        order_repo: Arc<O>,
        donation_repo: Arc<D>,
        cart_repo: Arc<C>,
        registration_amount_minor: i64,
        fee_rate: f64,
    ) -> Self {
        Self {
            registration_repo,
            order_repo,
            donation_repo,
            cart_repo,
            registration_amount_minor,
            fee_rate,
        }
    }

    fn net_minor(&self, gross_minor: i64) -> i64 {
        (gross_minor as f64 * (1.0 - self.fee_rate)).round() as i64
    }

    fn summarize(&self, totals: CollectionTotals) -> CollectionSummaryDto {
        let net_minor = self.net_minor(totals.gross_minor);
        CollectionSummaryDto {
            count: totals.count,
            gross_minor: totals.gross_minor,
            net_minor,
            gross: money::format_brl(totals.gross_minor),
            net: money::format_brl(net_minor),
        }
    }

    pub async fn dashboard(&self) -> Result<DashboardDto, AdminError> {
        let paid_registrations = self
            .registration_repo
            .count_paid()
            .await
            .map_err(AdminError::Internal)?;
        let order_totals = self
            .order_repo
            .approved_totals()
            .await
            .map_err(AdminError::Internal)?;
        let donation_totals = self
            .donation_repo
            .approved_totals()
            .await
            .map_err(AdminError::Internal)?;

        Ok(DashboardDto {
            registrations: self.summarize(CollectionTotals {
                count: paid_registrations,
                gross_minor: paid_registrations * self.registration_amount_minor,
            }),
            orders: self.summarize(order_totals),
            donations: self.summarize(donation_totals),
        })
    }

    pub async fn paid_registrations(&self) -> Result<Vec<PaidRegistrationDto>, AdminError> {
        let registrations = self
            .registration_repo
            .list_paid()
            .await
            .map_err(AdminError::Internal)?;

        Ok(registrations
            .into_iter()
            .map(|registration| PaidRegistrationDto {
                id: registration.id,
                full_name: registration.full_name,
                whatsapp: registration.whatsapp,
                cpf: registration.cpf,
                paid_at: registration
                    .paid_at
                    .map(dates::format_date_br)
                    .unwrap_or_default(),
            })
            .collect())
    }

    pub async fn orders_overview(&self) -> Result<OrdersOverviewDto, AdminError> {
        let orders = self
            .order_repo
            .list_all_with_buyer()
            .await
            .map_err(AdminError::Internal)?;
        let fulfillment = self
            .order_repo
            .fulfillment_tally()
            .await
            .map_err(AdminError::Internal)?;

        let orders = orders
            .into_iter()
            .map(|(order, buyer_name)| {
                let charge = order.charge();
                AdminOrderDto {
                    id: order.id,
                    buyer_name,
                    status: charge.status,
                    total: money::format_brl(order.total_minor),
                    net: money::format_brl(self.net_minor(order.total_minor)),
                    paid_at: order.paid_at.map(dates::format_datetime_br),
                    created_at: dates::format_datetime_br(order.created_at),
                }
            })
            .collect();

        Ok(OrdersOverviewDto {
            orders,
            fulfillment,
        })
    }

    pub async fn donations_overview(&self) -> Result<DonationsOverviewDto, AdminError> {
        let donations = self
            .donation_repo
            .list_all()
            .await
            .map_err(AdminError::Internal)?;
        let totals = self
            .donation_repo
            .approved_totals()
            .await
            .map_err(AdminError::Internal)?;

        let donations = donations
            .into_iter()
            .map(|donation| {
                let charge = donation.charge();
                AdminDonationDto {
                    id: donation.id,
                    donor_name: donation.donor_name,
                    contact: donation.contact,
                    status: charge.status,
                    amount: money::format_brl(donation.amount_minor),
                    net: money::format_brl(self.net_minor(donation.amount_minor)),
                    paid_at: donation.paid_at.map(dates::format_datetime_br),
                }
            })
            .collect();

        Ok(DonationsOverviewDto {
            donations,
            summary: self.summarize(totals),
        })
    }

    /// Marks an order approved by hand (e.g. payment confirmed out of
    /// band) and runs the same side effect a gateway approval would.
    pub async fn approve_order(&self, order_id: Uuid) -> Result<(), AdminError> {
        let owner = self
            .order_repo
            .force_approve(order_id)
            .await
            .map_err(AdminError::Internal)?
            .ok_or(AdminError::OrderNotFound)?;

        self.cart_repo
            .clear_for_user(owner)
            .await
            .map_err(|err| {
                error!(%order_id, db_error = ?err, "admin: failed to clear cart after manual approval");
                AdminError::Internal(err)
            })?;

        info!(%order_id, user_id = %owner, "admin: order approved manually");
        Ok(())
    }

    pub async fn purge_unpaid_orders(&self) -> Result<u64, AdminError> {
        let removed = self
            .order_repo
            .purge_unpaid()
            .await
            .map_err(AdminError::Internal)?;
        info!(removed, "admin: unpaid orders purged");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::cart::MockCartRepository;
    use crate::domain::repositories::donations::MockDonationRepository;
    use crate::domain::repositories::orders::MockOrderRepository;
    use crate::domain::repositories::registrations::MockRegistrationRepository;
    use mockall::predicate::eq;

    const REGISTRATION_AMOUNT: i64 = 10_100;
    const FEE_RATE: f64 = 0.0099;

    fn usecase(
        registration_repo: MockRegistrationRepository,
        order_repo: MockOrderRepository,
        donation_repo: MockDonationRepository,
        cart_repo: MockCartRepository,
    ) -> AdminUseCase<
        MockRegistrationRepository,
        MockOrderRepository,
        MockDonationRepository,
        MockCartRepository,
    > {
        AdminUseCase::new(
            Arc::new(registration_repo),
            Arc::new(order_repo),
            Arc::new(donation_repo),
            Arc::new(cart_repo),
            REGISTRATION_AMOUNT,
            FEE_RATE,
        )
    }

    #[tokio::test]
    async fn dashboard_nets_deduct_the_fee_from_each_collection() {
        let mut registration_repo = MockRegistrationRepository::new();
        let mut order_repo = MockOrderRepository::new();
        let mut donation_repo = MockDonationRepository::new();

        registration_repo
            .expect_count_paid()
            .returning(|| Box::pin(async move { Ok(3) }));
        order_repo.expect_approved_totals().returning(|| {
            Box::pin(async move {
                Ok(CollectionTotals {
                    count: 2,
                    gross_minor: 24_400,
                })
            })
        });
        donation_repo.expect_approved_totals().returning(|| {
            Box::pin(async move {
                Ok(CollectionTotals {
                    count: 1,
                    gross_minor: 5_000,
                })
            })
        });

        let dashboard = usecase(
            registration_repo,
            order_repo,
            donation_repo,
            MockCartRepository::new(),
        )
        .dashboard()
        .await
        .unwrap();

        let expect_net =
            |gross: i64| (gross as f64 * (1.0 - FEE_RATE)).round() as i64;

        assert_eq!(dashboard.registrations.count, 3);
        assert_eq!(dashboard.registrations.gross_minor, 3 * REGISTRATION_AMOUNT);
        assert_eq!(
            dashboard.registrations.net_minor,
            expect_net(3 * REGISTRATION_AMOUNT)
        );
        assert_eq!(dashboard.orders.net_minor, expect_net(24_400));
        assert_eq!(dashboard.donations.net_minor, expect_net(5_000));
    }

    #[tokio::test]
    async fn manual_approval_clears_the_owners_cart() {
        let order_id = Uuid::new_v4();
        let owner = Uuid::new_v4();

        let mut order_repo = MockOrderRepository::new();
        let mut cart_repo = MockCartRepository::new();

        order_repo
            .expect_force_approve()
            .with(eq(order_id))
            .times(1)
            .returning(move |_| Box::pin(async move { Ok(Some(owner)) }));
        cart_repo
            .expect_clear_for_user()
            .with(eq(owner))
            .times(1)
            .returning(|_| Box::pin(async move { Ok(()) }));

        usecase(
            MockRegistrationRepository::new(),
            order_repo,
            MockDonationRepository::new(),
            cart_repo,
        )
        .approve_order(order_id)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn manual_approval_of_unknown_order_is_not_found() {
        let mut order_repo = MockOrderRepository::new();
        order_repo
            .expect_force_approve()
            .returning(|_| Box::pin(async move { Ok(None) }));

        let err = usecase(
            MockRegistrationRepository::new(),
            order_repo,
            MockDonationRepository::new(),
            MockCartRepository::new(),
        )
        .approve_order(Uuid::new_v4())
        .await
        .unwrap_err();

        assert!(matches!(err, AdminError::OrderNotFound));
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }
}
