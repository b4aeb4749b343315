//! Provisioning plans: ordered lists of idempotent remote operations.

use serde_json::{json, Value};
use strum::{Display, EnumString};

/// Kind of backend resource a provisioning op targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ResourceType {
    /// A database table or column.
    Table,
    /// An object-storage bucket.
    Bucket,
    /// A user role assignment.
    Role,
    /// A row-level-security policy.
    Policy,
}

/// What a provisioning op targets and the state it should end in.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    /// Resource kind.
    pub resource_type: ResourceType,
    /// Name of the target resource.
    pub target_name: String,
    /// Human-readable desired state.
    pub desired_state: String,
}

/// The gateway call an op performs.
#[derive(Debug, Clone)]
pub enum OpAction {
    /// Execute a SQL statement through the RPC surface.
    ExecSql {
        /// The statement to run.
        sql: String,
    },
    /// Create a storage bucket.
    CreateBucket {
        /// Bucket name.
        name: String,
        /// Whether objects are publicly readable.
        public: bool,
    },
    /// Patch rows in a table.
    UpdateRows {
        /// Target table.
        table: String,
        /// `column=eq.value` filters.
        filters: Vec<(String, String)>,
        /// Patch body.
        body: Value,
    },
}

/// One idempotent remote operation.
#[derive(Debug, Clone)]
pub struct ProvisionOp {
    /// What this op provisions.
    pub descriptor: ResourceDescriptor,
    /// The gateway call to perform.
    pub action: OpAction,
}

impl ProvisionOp {
    /// Short label for printed per-op lines.
    pub fn label(&self) -> String {
        format!(
            "{} {} -> {}",
            self.descriptor.resource_type, self.descriptor.target_name, self.descriptor.desired_state
        )
    }
}

/// An ordered provisioning plan.
#[derive(Debug, Clone)]
pub struct ProvisionPlan {
    /// Plan name for banners and logs.
    pub name: String,
    /// Ops in application order.
    pub ops: Vec<ProvisionOp>,
}

fn sql_op(resource_type: ResourceType, target: &str, state: &str, sql: &str) -> ProvisionOp {
    ProvisionOp {
        descriptor: ResourceDescriptor {
            resource_type,
            target_name: target.to_string(),
            desired_state: state.to_string(),
        },
        action: OpAction::ExecSql {
            sql: sql.to_string(),
        },
    }
}

fn bucket_op(name: &str, public: bool) -> ProvisionOp {
    ProvisionOp {
        descriptor: ResourceDescriptor {
            resource_type: ResourceType::Bucket,
            target_name: name.to_string(),
            desired_state: if public { "public".to_string() } else { "private".to_string() },
        },
        action: OpAction::CreateBucket {
            name: name.to_string(),
            public,
        },
    }
}

/// Built-in schema plan: columns and policies the platform expects.
///
/// Statements use IF NOT EXISTS so re-running the plan is a no-op; the
/// runner additionally treats duplicate errors as success for hosted
/// backends that predate those clauses.
pub fn schema_plan() -> ProvisionPlan {
    ProvisionPlan {
        name: "schema".to_string(),
        ops: vec![
            sql_op(
                ResourceType::Table,
                "users.role",
                "column exists",
                "ALTER TABLE users ADD COLUMN IF NOT EXISTS role TEXT DEFAULT 'user';",
            ),
            sql_op(
                ResourceType::Table,
                "users.phone",
                "column exists",
                "ALTER TABLE users ADD COLUMN IF NOT EXISTS phone TEXT;",
            ),
            sql_op(
                ResourceType::Table,
                "bookings.payment_link_id",
                "column exists",
                "ALTER TABLE bookings ADD COLUMN IF NOT EXISTS payment_link_id TEXT;",
            ),
            sql_op(
                ResourceType::Table,
                "bookings.payment_status",
                "column exists",
                "ALTER TABLE bookings ADD COLUMN IF NOT EXISTS payment_status TEXT DEFAULT 'pending';",
            ),
            sql_op(
                ResourceType::Table,
                "banners",
                "table exists",
                "CREATE TABLE IF NOT EXISTS banners (id BIGSERIAL PRIMARY KEY, title TEXT, image_url TEXT, active BOOLEAN DEFAULT true, created_at TIMESTAMPTZ DEFAULT now());",
            ),
            sql_op(
                ResourceType::Policy,
                "banners_public_read",
                "policy exists",
                "CREATE POLICY banners_public_read ON banners FOR SELECT USING (active = true);",
            ),
        ],
    }
}

/// Built-in storage plan: the buckets the platform serves assets from.
pub fn storage_plan() -> ProvisionPlan {
    ProvisionPlan {
        name: "storage".to_string(),
        ops: vec![
            bucket_op("banners", true),
            bucket_op("product-images", true),
            bucket_op("avatars", true),
            bucket_op("documents", false),
        ],
    }
}

/// Single-op plan assigning a role to a user by email.
pub fn role_plan(email: &str, role: &str) -> ProvisionPlan {
    ProvisionPlan {
        name: format!("role:{}", role),
        ops: vec![ProvisionOp {
            descriptor: ResourceDescriptor {
                resource_type: ResourceType::Role,
                target_name: email.to_string(),
                desired_state: role.to_string(),
            },
            action: OpAction::UpdateRows {
                table: "users".to_string(),
                filters: vec![("email".to_string(), format!("eq.{}", email))],
                body: json!({ "role": role }),
            },
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn resource_type_round_trips() {
        assert_eq!(ResourceType::Bucket.to_string(), "bucket");
        assert_eq!(ResourceType::from_str("table").unwrap(), ResourceType::Table);
        assert_eq!(ResourceType::from_str("policy").unwrap(), ResourceType::Policy);
    }

    #[test]
    fn schema_plan_orders_tables_before_policies() {
        let plan = schema_plan();
        assert!(!plan.ops.is_empty());

        let first_policy = plan
            .ops
            .iter()
            .position(|op| op.descriptor.resource_type == ResourceType::Policy)
            .unwrap();
        let last_table = plan
            .ops
            .iter()
            .rposition(|op| op.descriptor.resource_type == ResourceType::Table)
            .unwrap();
        assert!(last_table < first_policy);
    }

    #[test]
    fn storage_plan_creates_known_buckets() {
        let plan = storage_plan();
        let names: Vec<_> = plan
            .ops
            .iter()
            .map(|op| op.descriptor.target_name.as_str())
            .collect();
        assert!(names.contains(&"banners"));
        assert!(names.contains(&"documents"));
    }

    #[test]
    fn role_plan_filters_by_email() {
        let plan = role_plan("admin@cubalink.example", "admin");
        assert_eq!(plan.ops.len(), 1);

        match &plan.ops[0].action {
            OpAction::UpdateRows { table, filters, body } => {
                assert_eq!(table, "users");
                assert_eq!(
                    filters[0],
                    ("email".to_string(), "eq.admin@cubalink.example".to_string())
                );
                assert_eq!(body["role"], "admin");
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn op_labels_are_descriptive() {
        let plan = role_plan("user@cubalink.example", "vendor");
        assert_eq!(plan.ops[0].label(), "role user@cubalink.example -> vendor");
    }
}
