use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    entities::{
        addresses::{AddressEntity, InsertAddressEntity},
        bank_accounts::InsertBankAccountEntity,
        users::UserEntity,
    },
    value_objects::enums::user_roles::Role,
};

#[derive(Debug, Clone, Deserialize)]
pub struct SignupModel {
    pub email: String,
    pub password: String,
    pub phone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginModel {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerificationCodeModel {
    pub code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AddressModel {
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    pub city: String,
    pub post_code: String,
    pub country: String,
}

impl AddressModel {
    pub fn to_entity(&self, user_id: i32) -> InsertAddressEntity {
        InsertAddressEntity {
            user_id,
            address_line1: self.address_line1.clone(),
            address_line2: self.address_line2.clone(),
            city: self.city.clone(),
            post_code: self.post_code.clone(),
            country: self.country.clone(),
            updated_at: Utc::now(),
        }
    }
}

impl From<AddressEntity> for AddressModel {
    fn from(entity: AddressEntity) -> Self {
        Self {
            address_line1: entity.address_line1,
            address_line2: entity.address_line2,
            city: entity.city,
            post_code: entity.post_code,
            country: entity.country,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileModel {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub address: AddressModel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BecomeSellerModel {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub bank_account_number: String,
    pub swift_code: String,
    pub payment_type: String,
}

impl BecomeSellerModel {
    pub fn to_bank_account_entity(&self, user_id: i32) -> InsertBankAccountEntity {
        InsertBankAccountEntity {
            user_id,
            account_number: self.bank_account_number.clone(),
            swift_code: self.swift_code.clone(),
            payment_type: self.payment_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TokenDto {
    pub token: String,
}

/// Public view of a user; never carries the password hash or one-time code.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserProfileDto {
    pub id: i32,
    pub email: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub verified: bool,
    pub address: Option<AddressModel>,
    pub created_at: DateTime<Utc>,
}

impl UserProfileDto {
    pub fn from_parts(user: UserEntity, role: Role, address: Option<AddressEntity>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            phone: user.phone,
            first_name: user.first_name,
            last_name: user.last_name,
            role,
            verified: user.verified,
            address: address.map(AddressModel::from),
            created_at: user.created_at,
        }
    }
}
