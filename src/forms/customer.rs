use serde::Deserialize;
use validator::Validate;

use crate::domain::claim::ClaimRequest;
use crate::domain::customer::{CustomerDetails, NewCustomer, UpdateCustomer};
use crate::domain::types::{CustomerCode, NetWeight};
use crate::forms::FormError;

#[derive(Deserialize, Validate)]
/// Form data for adding a customer by hand.
pub struct AddCustomerForm {
    #[validate(length(min = 1))]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub house_name: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub pin_code: String,
    #[serde(default)]
    pub mobile: String,
    /// Grams; blank means zero.
    #[serde(default)]
    pub net_weight: String,
    #[serde(default)]
    pub last_sales_date: Option<String>,
}

impl AddCustomerForm {
    pub fn into_new_customer(self) -> Result<NewCustomer, FormError> {
        self.validate()?;
        let code = CustomerCode::new(self.code).map_err(|_| FormError::InvalidCustomerCode)?;
        let net_weight = NetWeight::parse(&self.net_weight)
            .map_err(|e| FormError::InvalidNetWeight(e.to_string()))?;
        let details = CustomerDetails::new(
            self.name,
            self.house_name,
            self.street,
            self.place,
            self.pin_code,
            self.mobile,
            self.last_sales_date,
        );
        Ok(NewCustomer::new(code, details, net_weight))
    }
}

#[derive(Deserialize, Validate)]
/// Form data for editing an existing customer. The code itself is immutable.
pub struct SaveCustomerForm {
    #[validate(length(min = 1))]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub house_name: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub pin_code: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub last_sales_date: Option<String>,
}

impl SaveCustomerForm {
    pub fn into_update(self) -> Result<(CustomerCode, UpdateCustomer), FormError> {
        self.validate()?;
        let code = CustomerCode::new(self.code).map_err(|_| FormError::InvalidCustomerCode)?;
        let details = CustomerDetails::new(
            self.name,
            self.house_name,
            self.street,
            self.place,
            self.pin_code,
            self.mobile,
            self.last_sales_date,
        );
        Ok((code, UpdateCustomer::new(details)))
    }
}

#[derive(Deserialize)]
pub struct DeleteCustomerForm {
    pub code: String,
}

impl DeleteCustomerForm {
    pub fn customer_code(&self) -> Result<CustomerCode, FormError> {
        CustomerCode::new(self.code.as_str()).map_err(|_| FormError::InvalidCustomerCode)
    }
}

#[derive(Deserialize)]
/// Claim request as posted from the claim dialog.
pub struct ClaimForm {
    pub code: String,
    pub amount: String,
    /// Unclaimed balance shown in the dialog when it was opened.
    pub unclaimed: i64,
}

impl ClaimForm {
    /// Returns the request together with the balance snapshot it was made against.
    pub fn to_request(&self) -> Result<(ClaimRequest, i64), FormError> {
        let code =
            CustomerCode::new(self.code.as_str()).map_err(|_| FormError::InvalidCustomerCode)?;
        let amount = self
            .amount
            .trim()
            .parse::<i64>()
            .map_err(|_| FormError::InvalidClaimAmount)?;
        Ok((ClaimRequest::new(code, amount), self.unclaimed))
    }
}
