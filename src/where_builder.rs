//! 查询构建器接口，把解析结果转换为存储层的查询条件
//!
//! 构建器本身不在本 crate 中，它只需要开启、关闭布尔作用域，
//! 并为每个条件添加一个比较。

use crate::ast::{Connector, Direction, Operator, OrderByPart, Part, Value};

/// 以作用域和比较事件流的形式接收过滤表达式
pub trait WhereBuilder {
    fn open(&mut self, connector: Connector);
    fn close(&mut self, connector: Connector);
    fn compare(&mut self, field: &str, value: &Value, operator: Operator);
}

pub trait OrderByBuilder {
    fn order_by(&mut self, field: &str, direction: Direction);
}

/// 按顺序遍历 `parts`，驱动 `builder`
pub fn apply_filters<B: WhereBuilder + ?Sized>(parts: &[Part], builder: &mut B) {
    for part in parts {
        match part {
            Part::OpenGroup(connector) => builder.open(*connector),
            Part::CloseGroup(connector) => builder.close(*connector),
            Part::Leaf {
                field,
                value,
                operator,
            } => builder.compare(field, value, *operator),
        }
    }
}

pub fn apply_order_by<B: OrderByBuilder + ?Sized>(parts: &[OrderByPart], builder: &mut B) {
    for part in parts {
        builder.order_by(&part.field, part.direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FiltersQueryParam;
    use crate::order_by::OrderByQueryParam;
    use crate::serializer::serialize_value;

    /// 把构建器事件渲染为中缀表达式
    #[derive(Default)]
    struct InfixBuilder {
        out: String,
        stack: Vec<(Connector, bool)>,
    }

    impl InfixBuilder {
        fn separate(&mut self) {
            if let Some((connector, has_items)) = self.stack.last_mut() {
                if *has_items {
                    self.out.push_str(match connector {
                        Connector::And => " AND ",
                        Connector::Or => " OR ",
                    });
                }
                *has_items = true;
            }
        }
    }

    impl WhereBuilder for InfixBuilder {
        fn open(&mut self, connector: Connector) {
            self.separate();
            self.out.push('(');
            self.stack.push((connector, false));
        }

        fn close(&mut self, _connector: Connector) {
            self.stack.pop();
            self.out.push(')');
        }

        fn compare(&mut self, field: &str, value: &Value, operator: Operator) {
            self.separate();
            self.out
                .push_str(&format!("{field} {operator} {}", serialize_value(value)));
        }
    }

    impl OrderByBuilder for Vec<(String, char)> {
        fn order_by(&mut self, field: &str, direction: Direction) {
            self.push((field.to_string(), direction.symbol()));
        }
    }

    #[test]
    fn test_apply_filters() {
        let mut filters = FiltersQueryParam::new("a eq 'b' and (c eq 'd' or e gt 3)");
        let mut builder = InfixBuilder::default();
        apply_filters(filters.parts().unwrap(), &mut builder);
        assert_eq!(builder.out, "(a = 'b' AND (c = 'd' OR e > 3))");
    }

    #[test]
    fn test_apply_cleaned_filters() {
        let mut filters = FiltersQueryParam::new("id eq 1 and (secret eq 2 or secret eq 3)");
        filters.clean(|field, _, _| field == "id", true).unwrap();
        let mut builder = InfixBuilder::default();
        apply_filters(filters.parts().unwrap(), &mut builder);
        assert_eq!(builder.out, "(id = 1)");
    }

    #[test]
    fn test_apply_order_by() {
        let mut order_by = OrderByQueryParam::new("a desc, b");
        let mut columns: Vec<(String, char)> = Vec::new();
        apply_order_by(order_by.parts().unwrap(), &mut columns);
        assert_eq!(columns, vec![("a".to_string(), '<'), ("b".to_string(), '>')]);
    }
}
