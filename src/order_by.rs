//! `$orderBy` 参数：逗号分隔的 `field [asc|desc]`

use crate::ast::{Direction, OrderByPart};
use crate::error::{ParseError, Result};
use crate::masker::mask;
use crate::options::quote_if_needed;
use crate::query_param::{Dialect, QueryParam};

const SEPARATOR: char = ',';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderBy;

impl Dialect for OrderBy {
    type Part = OrderByPart;

    const NAME: &'static str = "order by";

    fn parse(&self, input: &str) -> Result<Vec<OrderByPart>> {
        let masked = mask(input)?;
        let mut parts = Vec::new();

        for piece in masked.as_str().split(SEPARATOR) {
            let words: Vec<&str> = piece.split_whitespace().collect();
            let (field, direction) = match words.as_slice() {
                [] => continue,
                [field] => (*field, Direction::Asc),
                [field, keyword] => {
                    let direction = Direction::from_keyword(keyword).ok_or_else(|| {
                        ParseError::new(format!(
                            "invalid order by direction '{}', expected asc or desc",
                            masked.restore(keyword)
                        ))
                    })?;
                    (*field, direction)
                }
                _ => {
                    return Err(ParseError::new(format!(
                        "invalid order by entry '{}'",
                        masked.restore(piece.trim())
                    )))
                }
            };

            let field = match masked.unquote(field) {
                Some(content) => content.to_string(),
                None => masked.restore(field),
            };
            parts.push(OrderByPart::new(field, direction));
        }

        Ok(parts)
    }

    fn merge_strings(&self, first: &str, second: &str) -> String {
        format!("{first}{SEPARATOR}{second}")
    }

    fn merge_parts(&self, mut first: Vec<OrderByPart>, second: Vec<OrderByPart>) -> Vec<OrderByPart> {
        first.extend(second);
        first
    }

    fn build_string(&self, parts: &[OrderByPart]) -> String {
        parts
            .iter()
            .map(|part| {
                format!(
                    "{} {}",
                    quote_if_needed(&part.field),
                    part.direction.keyword()
                )
            })
            .collect::<Vec<_>>()
            .join(&SEPARATOR.to_string())
    }
}

pub type OrderByQueryParam = QueryParam<OrderBy>;

impl QueryParam<OrderBy> {
    /// 保留 `validate(field, direction)` 接受的排序项
    pub fn clean<F>(&mut self, mut validate: F, reset: bool) -> Result<()>
    where
        F: FnMut(&str, Direction) -> bool,
    {
        self.clean_with(reset, |_, parts| {
            parts
                .iter()
                .filter(|part| validate(&part.field, part.direction))
                .cloned()
                .collect()
        })
    }

    pub fn get_order_by(&mut self, field: &str) -> Result<Option<&OrderByPart>> {
        Ok(self.parts()?.iter().find(|part| part.field == field))
    }

    pub fn has_order_by(&mut self, field: &str) -> Result<bool> {
        Ok(self.get_order_by(field)?.is_some())
    }
}
