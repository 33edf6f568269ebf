//! `employee_infos` table. The weekly schedule is stored as JSON text.

use sea_orm::entity::prelude::*;

use crate::domain::{EmployeeInfo, Money};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "employee_infos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub profile_id: Uuid,
    pub position: String,
    pub contract: String,
    pub hire_date: Date,
    pub hourly_wage_cents: i64,
    pub weekly_hours: f64,
    pub schedule: String,
    pub social_security_number: Option<String>,
    pub emergency_phone: Option<String>,
    pub emergency_contact: Option<String>,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::ProfileId",
        to = "super::profile::Column::Id",
        on_delete = "Cascade"
    )]
    Profile,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for EmployeeInfo {
    fn from(model: Model) -> Self {
        EmployeeInfo {
            id: model.id,
            profile_id: model.profile_id,
            position: model.position.parse().unwrap_or_default(),
            contract: model.contract.parse().unwrap_or_default(),
            hire_date: model.hire_date,
            hourly_wage: Money::from_cents(model.hourly_wage_cents),
            weekly_hours: model.weekly_hours,
            schedule: serde_json::from_str(&model.schedule).unwrap_or_default(),
            social_security_number: model.social_security_number,
            emergency_phone: model.emergency_phone,
            emergency_contact: model.emergency_contact,
            active: model.active,
        }
    }
}
