use sqlx::{Postgres, QueryBuilder};
use time::PrimitiveDateTime;

/// Conjunctive filter over `solar_plant_data`.
///
/// Starts unconstrained (all rows); every builder call narrows it. Both
/// timestamp bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataFilter {
    pub id: Option<i32>,
    pub start: Option<PrimitiveDateTime>,
    pub end: Option<PrimitiveDateTime>,
}

impl DataFilter {
    pub fn with_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn from(mut self, start: PrimitiveDateTime) -> Self {
        self.start = Some(start);
        self
    }

    pub fn until(mut self, end: PrimitiveDateTime) -> Self {
        self.end = Some(end);
        self
    }

    pub fn is_unconstrained(&self) -> bool {
        self.id.is_none() && self.start.is_none() && self.end.is_none()
    }

    /// Append ` WHERE ... AND ...` for every present constraint.
    pub fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        if self.is_unconstrained() {
            return;
        }

        builder.push(" WHERE ");
        let mut clauses = builder.separated(" AND ");
        if let Some(id) = self.id {
            clauses.push("id = ");
            clauses.push_bind_unseparated(id);
        }
        if let Some(start) = self.start {
            clauses.push("\"timestamp\" >= ");
            clauses.push_bind_unseparated(start);
        }
        if let Some(end) = self.end {
            clauses.push("\"timestamp\" <= ");
            clauses.push_bind_unseparated(end);
        }
    }
}
