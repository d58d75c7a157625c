use std::cmp::Ordering;

use gpui::SharedString;
use rust_decimal::Decimal;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum StringFormat {
    Email,
    Url,
    Uuid,
}

impl StringFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            StringFormat::Email => "email",
            StringFormat::Url => "url",
            StringFormat::Uuid => "uuid",
        }
    }
}

/// One end of a numeric range.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Bound {
    pub value: Decimal,
    pub inclusive: bool,
}

impl Bound {
    pub const fn inclusive(value: Decimal) -> Self {
        Self {
            value,
            inclusive: true,
        }
    }

    pub const fn exclusive(value: Decimal) -> Self {
        Self {
            value,
            inclusive: false,
        }
    }

    pub fn admits_above(self, candidate: Decimal) -> bool {
        if self.inclusive {
            candidate >= self.value
        } else {
            candidate > self.value
        }
    }

    pub fn admits_below(self, candidate: Decimal) -> bool {
        if self.inclusive {
            candidate <= self.value
        } else {
            candidate < self.value
        }
    }

    fn tighter_lower(self, other: Bound) -> Bound {
        match self.value.cmp(&other.value) {
            Ordering::Greater => self,
            Ordering::Less => other,
            Ordering::Equal if !self.inclusive => self,
            Ordering::Equal => other,
        }
    }

    fn tighter_upper(self, other: Bound) -> Bound {
        match self.value.cmp(&other.value) {
            Ordering::Less => self,
            Ordering::Greater => other,
            Ordering::Equal if !self.inclusive => self,
            Ordering::Equal => other,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Check {
    MinLength(usize),
    MaxLength(usize),
    Length(usize),
    GreaterThan(Bound),
    LessThan(Bound),
    Integer,
    Format(StringFormat),
    MinSize(u64),
    MaxSize(u64),
    Mime(Vec<SharedString>),
}

/// Effective constraints of a node after folding all of its checks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bag {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub greater_than: Option<Bound>,
    pub less_than: Option<Bound>,
    pub integer: bool,
    pub formats: Vec<StringFormat>,
    pub min_size: Option<u64>,
    pub max_size: Option<u64>,
    pub mime: Option<Vec<SharedString>>,
}

impl Bag {
    pub fn from_checks(checks: &[Check]) -> Self {
        let mut bag = Bag::default();
        for check in checks {
            match check {
                Check::MinLength(length) => bag.raise_min_length(*length),
                Check::MaxLength(length) => bag.lower_max_length(*length),
                Check::Length(length) => {
                    bag.raise_min_length(*length);
                    bag.lower_max_length(*length);
                }
                Check::GreaterThan(bound) => {
                    bag.greater_than = Some(match bag.greater_than {
                        Some(current) => current.tighter_lower(*bound),
                        None => *bound,
                    });
                }
                Check::LessThan(bound) => {
                    bag.less_than = Some(match bag.less_than {
                        Some(current) => current.tighter_upper(*bound),
                        None => *bound,
                    });
                }
                Check::Integer => bag.integer = true,
                Check::Format(format) => {
                    if !bag.formats.contains(format) {
                        bag.formats.push(*format);
                    }
                }
                Check::MinSize(bytes) => {
                    bag.min_size = Some(bag.min_size.map_or(*bytes, |current| current.max(*bytes)));
                }
                Check::MaxSize(bytes) => {
                    bag.max_size = Some(bag.max_size.map_or(*bytes, |current| current.min(*bytes)));
                }
                Check::Mime(types) => bag.mime = Some(types.clone()),
            }
        }
        bag
    }

    pub fn has_format(&self, format: StringFormat) -> bool {
        self.formats.contains(&format)
    }

    fn raise_min_length(&mut self, length: usize) {
        self.min_length = Some(self.min_length.map_or(length, |current| current.max(length)));
    }

    fn lower_max_length(&mut self, length: usize) {
        self.max_length = Some(self.max_length.map_or(length, |current| current.min(length)));
    }
}
