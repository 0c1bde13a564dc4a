//! Line item and buyer details attached to an invoice.

use rust_decimal::Decimal;

use crate::util::Amount;

/// The goods or service an invoice is issued for.
///
/// Prices are coerced through [`Amount`], so both native numbers and en_US
/// formatted strings are accepted:
///
/// ```
/// use bitpay_types::item::Item;
/// use bitpay_types::util::Amount;
///
/// let item = Item::new("1,250.00".parse::<Amount>().unwrap())
///     .with_code("sku-42")
///     .with_description("Annual subscription");
/// assert_eq!(item.price.to_string(), "1250.00");
/// assert!(!item.physical);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Item {
    pub code: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
    pub tax_included: Decimal,
    pub quantity: Option<u32>,
    pub physical: bool,
}

impl Item {
    pub fn new(price: impl Into<Amount>) -> Self {
        Self {
            price: price.into().0,
            ..Self::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tax_included(mut self, tax_included: impl Into<Amount>) -> Self {
        self.tax_included = tax_included.into().0;
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_physical(mut self, physical: bool) -> Self {
        self.physical = physical;
        self
    }
}

/// Contact details of the person paying an invoice.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Buyer {
    pub name: Option<String>,
    /// Up to two street address lines.
    pub address: Vec<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notify: bool,
}

impl Buyer {
    /// Joins first and last name the way the API's `buyerName` field expects.
    pub fn with_name(mut self, first: &str, last: &str) -> Self {
        let name = format!("{first} {last}").trim().to_string();
        self.name = (!name.is_empty()).then_some(name);
        self
    }

    pub fn with_address_line(mut self, line: impl Into<String>) -> Self {
        self.address.push(line.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_zip(mut self, zip: impl Into<String>) -> Self {
        self.zip = Some(zip.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }
}
