use super::Expression;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    Asc,
    Desc,
}

/// Placement of NULLs within an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NullHandling {
    #[default]
    Default,
    NullsFirst,
    NullsLast,
}

/// One `ORDER BY` item.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSpecifier {
    pub target: Expression,
    pub order: Order,
    pub nulls: NullHandling,
}

impl OrderSpecifier {
    pub fn asc(target: impl Into<Expression>) -> Self {
        Self {
            target: target.into(),
            order: Order::Asc,
            nulls: NullHandling::Default,
        }
    }

    pub fn desc(target: impl Into<Expression>) -> Self {
        Self {
            target: target.into(),
            order: Order::Desc,
            nulls: NullHandling::Default,
        }
    }

    pub fn nulls_first(self) -> Self {
        Self {
            nulls: NullHandling::NullsFirst,
            ..self
        }
    }

    pub fn nulls_last(self) -> Self {
        Self {
            nulls: NullHandling::NullsLast,
            ..self
        }
    }
}
