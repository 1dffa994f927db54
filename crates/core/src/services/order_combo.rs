//! Combo orders and their approval gate.
//!
//! Small combos (at most `auto_approve_max_slots` slots) are approved at
//! purchase; larger ones wait for an admin. Slot counters are set at
//! purchase and left alone by approval decisions.

use chrono::Utc;
use sea_orm::Set;
use tutorhub_common::{AppError, AppResult, IdGenerator};
use tutorhub_db::{
    entities::{
        combo,
        notification::NotificationType,
        order_combo::{self, OrderApprovalStatus},
    },
    repositories::{AccountRepository, ComboRepository, OrderComboRepository},
};

use super::notification::{Notice, NotificationService};

/// Approval status a new order starts in.
#[must_use]
pub const fn initial_approval_status(slot: i32, auto_approve_max_slots: i32) -> OrderApprovalStatus {
    if slot <= auto_approve_max_slots {
        OrderApprovalStatus::Approved
    } else {
        OrderApprovalStatus::Pending
    }
}

/// Check that an admin may move an order from `current` to `next`.
///
/// Pending orders can be approved or rejected; an approved order can still
/// be rejected. Rejection is final.
pub fn check_approval_change(
    current: OrderApprovalStatus,
    next: OrderApprovalStatus,
) -> AppResult<()> {
    use OrderApprovalStatus::{Approved, Pending, Rejected};

    match (current, next) {
        (Pending, Approved | Rejected) | (Approved, Rejected) => Ok(()),
        (_, Pending) => Err(AppError::BadRequest(
            "Orders cannot be moved back to pending".to_string(),
        )),
        _ => Err(AppError::BadRequest(format!(
            "Order is already {}",
            current.as_str()
        ))),
    }
}

/// Build the order row for a purchase.
#[must_use]
pub fn new_order(
    id: String,
    account_id: &str,
    combo: &combo::Model,
    auto_approve_max_slots: i32,
) -> order_combo::ActiveModel {
    order_combo::ActiveModel {
        id: Set(id),
        account_id: Set(account_id.to_string()),
        combo_id: Set(combo.id.clone()),
        used_slot: Set(0),
        remaining_slot: Set(combo.slot),
        price: Set(combo.price),
        status: Set(true),
        approval_status: Set(initial_approval_status(combo.slot, auto_approve_max_slots)),
        reviewed_by: Set(None),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
}

/// Who hears about a purchase: every admin, plus the purchaser when the
/// order was approved on the spot.
#[must_use]
pub fn purchase_notices(
    admin_ids: &[String],
    order: &order_combo::Model,
    combo_name: &str,
) -> Vec<Notice> {
    let mut notices: Vec<Notice> = admin_ids
        .iter()
        .map(|admin_id| {
            let message = match order.approval_status {
                OrderApprovalStatus::Pending => {
                    format!("Order for {combo_name} is waiting for approval")
                }
                _ => format!("Order for {combo_name} was placed and approved automatically"),
            };
            Notice::new(
                admin_id.clone(),
                NotificationType::OrderCreated,
                "New combo order",
                message,
            )
            .related_to(order.id.clone())
        })
        .collect();

    if order.approval_status == OrderApprovalStatus::Approved {
        notices.push(
            Notice::new(
                order.account_id.clone(),
                NotificationType::OrderApproved,
                "Order approved",
                format!("Your order for {combo_name} is ready to use"),
            )
            .related_to(order.id.clone()),
        );
    }

    notices
}

/// Notice to the purchaser after an admin decision.
#[must_use]
pub fn decision_notice(order: &order_combo::Model) -> Notice {
    let (kind, title, message) = match order.approval_status {
        OrderApprovalStatus::Rejected => (
            NotificationType::OrderRejected,
            "Order rejected",
            "Your combo order was rejected",
        ),
        _ => (
            NotificationType::OrderApproved,
            "Order approved",
            "Your combo order was approved",
        ),
    };
    Notice::new(order.account_id.clone(), kind, title, message).related_to(order.id.clone())
}

/// Order combo service.
#[derive(Clone)]
pub struct OrderComboService {
    order_repo: OrderComboRepository,
    combo_repo: ComboRepository,
    account_repo: AccountRepository,
    notifications: NotificationService,
    auto_approve_max_slots: i32,
    id_gen: IdGenerator,
}

impl OrderComboService {
    /// Create a new order combo service.
    #[must_use]
    pub const fn new(
        order_repo: OrderComboRepository,
        combo_repo: ComboRepository,
        account_repo: AccountRepository,
        notifications: NotificationService,
        auto_approve_max_slots: i32,
    ) -> Self {
        Self {
            order_repo,
            combo_repo,
            account_repo,
            notifications,
            auto_approve_max_slots,
            id_gen: IdGenerator::new(),
        }
    }

    /// Buy a combo.
    pub async fn purchase(&self, account_id: &str, combo_id: &str) -> AppResult<order_combo::Model> {
        let combo = self
            .combo_repo
            .find_by_id(combo_id)
            .await?
            .filter(|c| c.is_active)
            .ok_or_else(|| AppError::NotFound(format!("Combo not found: {combo_id}")))?;

        let order = self
            .order_repo
            .create(new_order(
                self.id_gen.generate(),
                account_id,
                &combo,
                self.auto_approve_max_slots,
            ))
            .await?;

        tracing::info!(
            order_id = %order.id,
            combo_id = %combo.id,
            approval_status = order.approval_status.as_str(),
            "Combo purchased"
        );

        let admin_ids = match self.account_repo.find_admin_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to look up admins for order notice");
                Vec::new()
            }
        };
        self.notifications
            .deliver(purchase_notices(&admin_ids, &order, &combo.name))
            .await;

        Ok(order)
    }

    /// All orders, optionally filtered by approval status.
    pub async fn list(
        &self,
        approval_status: Option<OrderApprovalStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<order_combo::Model>> {
        self.order_repo.list(approval_status, limit, offset).await
    }

    /// The caller's orders.
    pub async fn list_mine(&self, account_id: &str) -> AppResult<Vec<order_combo::Model>> {
        self.order_repo.find_by_account(account_id).await
    }

    /// Apply an admin decision to an order.
    pub async fn set_approval(
        &self,
        order_id: &str,
        admin_id: &str,
        decision: OrderApprovalStatus,
    ) -> AppResult<order_combo::Model> {
        let order = self.order_repo.get_by_id(order_id).await?;
        check_approval_change(order.approval_status, decision)?;

        let now = Utc::now();
        let applied = self
            .order_repo
            .set_approval(order_id, order.approval_status, decision, admin_id, now.into())
            .await?;
        if !applied {
            return Err(AppError::BadRequest("Order already processed".to_string()));
        }

        let updated = order_combo::Model {
            approval_status: decision,
            status: order.status && decision != OrderApprovalStatus::Rejected,
            reviewed_by: Some(admin_id.to_string()),
            updated_at: Some(now.into()),
            ..order
        };

        tracing::info!(
            order_id = %order_id,
            admin_id = %admin_id,
            approval_status = decision.as_str(),
            "Order reviewed"
        );

        self.notifications
            .deliver(vec![decision_notice(&updated)])
            .await;

        Ok(updated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;
    use tutorhub_db::{repositories::NotificationRepository, test_utils::fixtures};

    fn service(orders: MockDatabase, combos: MockDatabase, accounts: MockDatabase) -> OrderComboService {
        let notify_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        OrderComboService::new(
            OrderComboRepository::new(Arc::new(orders.into_connection())),
            ComboRepository::new(Arc::new(combos.into_connection())),
            AccountRepository::new(Arc::new(accounts.into_connection())),
            NotificationService::new(NotificationRepository::new(Arc::new(notify_db))),
            2,
        )
    }

    fn admins() -> Vec<String> {
        vec!["ad1".to_string(), "ad2".to_string()]
    }

    #[test]
    fn test_threshold() {
        assert_eq!(initial_approval_status(1, 2), OrderApprovalStatus::Approved);
        assert_eq!(initial_approval_status(2, 2), OrderApprovalStatus::Approved);
        assert_eq!(initial_approval_status(3, 2), OrderApprovalStatus::Pending);
    }

    #[test]
    fn test_new_order_slot_counters() {
        let combo = fixtures::combo("c1", 5);
        let order = new_order("o1".to_string(), "s1", &combo, 2);

        assert_eq!(order.used_slot.clone().unwrap(), 0);
        assert_eq!(order.remaining_slot.clone().unwrap(), 5);
        assert!(order.status.clone().unwrap());
        assert_eq!(order.approval_status.clone().unwrap(), OrderApprovalStatus::Pending);
    }

    #[test]
    fn test_small_combo_notifies_admins_and_purchaser() {
        let order = fixtures::order("o1", "s1", 2, OrderApprovalStatus::Approved);
        let notices = purchase_notices(&admins(), &order, "Starter");

        assert_eq!(notices.len(), 3);
        assert_eq!(notices[2].recipient_id, "s1");
        assert_eq!(notices[2].kind, NotificationType::OrderApproved);
    }

    #[test]
    fn test_large_combo_notifies_admins_only() {
        let order = fixtures::order("o1", "s1", 10, OrderApprovalStatus::Pending);
        let notices = purchase_notices(&admins(), &order, "Intensive");

        assert_eq!(notices.len(), 2);
        assert!(notices.iter().all(|n| n.recipient_id != "s1"));
        assert!(notices.iter().all(|n| n.kind == NotificationType::OrderCreated));
    }

    #[test]
    fn test_approval_changes() {
        use OrderApprovalStatus::{Approved, Pending, Rejected};

        assert!(check_approval_change(Pending, Approved).is_ok());
        assert!(check_approval_change(Pending, Rejected).is_ok());
        assert!(check_approval_change(Approved, Rejected).is_ok());
        assert!(check_approval_change(Approved, Approved).is_err());
        assert!(check_approval_change(Rejected, Approved).is_err());
        assert!(check_approval_change(Approved, Pending).is_err());
    }

    #[tokio::test]
    async fn test_reject_deactivates_and_keeps_slots() {
        let orders = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![fixtures::order(
                "o1",
                "s1",
                5,
                OrderApprovalStatus::Pending,
            )]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);

        let rejected = service(
            orders,
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        )
        .set_approval("o1", "ad1", OrderApprovalStatus::Rejected)
        .await
        .unwrap();

        assert_eq!(rejected.approval_status, OrderApprovalStatus::Rejected);
        assert!(!rejected.status);
        assert_eq!(rejected.remaining_slot, 5);
        assert_eq!(rejected.used_slot, 0);
    }

    #[tokio::test]
    async fn test_purchase_inactive_combo_not_found() {
        let mut combo = fixtures::combo("c1", 2);
        combo.is_active = false;
        let combos = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![combo]]);

        let result = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            combos,
            MockDatabase::new(DatabaseBackend::Postgres),
        )
        .purchase("s1", "c1")
        .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_purchase_small_combo_is_approved() {
        let combos = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![fixtures::combo("c1", 2)]]);
        let orders = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![
            fixtures::order("o1", "s1", 2, OrderApprovalStatus::Approved),
        ]]);
        let accounts = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![
            fixtures::account("ad1", tutorhub_db::entities::account::AccountRole::Admin),
        ]]);

        let order = service(orders, combos, accounts)
            .purchase("s1", "c1")
            .await
            .unwrap();

        assert_eq!(order.approval_status, OrderApprovalStatus::Approved);
        assert_eq!(order.remaining_slot, 2);
    }
}
