//! Field-copy conversions between wire DTOs and persisted entities.
//!
//! [`Mapper`] is constructed once at startup and handed to handlers through the
//! application state. It holds no configuration; the conversions are plain trait impls.

use domain::models::{AddressDto, AddressToManipulateDto, UserDto, UserToManipulateDto};
use persistence::entities::{AddressEntity, UserEntity};

/// Conversion into a new value.
pub trait Map<S, D> {
    fn map(&self, source: S) -> D;
}

/// Conversion onto an existing value, replacing every mapped field.
pub trait MapOnto<S, D> {
    fn map_onto(&self, source: S, destination: &mut D);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Mapper;

impl Mapper {
    pub fn new() -> Self {
        Self
    }

    pub fn map_all<S, D, I>(&self, items: I) -> Vec<D>
    where
        I: IntoIterator<Item = S>,
        Self: Map<S, D>,
    {
        items
            .into_iter()
            .map(|item| <Self as Map<S, D>>::map(self, item))
            .collect()
    }
}

impl Map<&AddressEntity, AddressDto> for Mapper {
    fn map(&self, source: &AddressEntity) -> AddressDto {
        AddressDto {
            id: source.id,
            address_line1: source.address_line1.clone(),
            address_line2: source.address_line2.clone(),
            address_line3: source.address_line3.clone(),
            post_code: source.post_code.clone(),
        }
    }
}

impl Map<&AddressDto, AddressEntity> for Mapper {
    fn map(&self, source: &AddressDto) -> AddressEntity {
        AddressEntity {
            id: source.id,
            address_line1: source.address_line1.clone(),
            address_line2: source.address_line2.clone(),
            address_line3: source.address_line3.clone(),
            post_code: source.post_code.clone(),
        }
    }
}

/// New entity with id 0; the store assigns the real id on save.
impl Map<&AddressToManipulateDto, AddressEntity> for Mapper {
    fn map(&self, source: &AddressToManipulateDto) -> AddressEntity {
        let mut address = AddressEntity::default();
        self.map_onto(source, &mut address);
        address
    }
}

/// Leaves `id` untouched.
impl MapOnto<&AddressToManipulateDto, AddressEntity> for Mapper {
    fn map_onto(&self, source: &AddressToManipulateDto, destination: &mut AddressEntity) {
        destination.address_line1 = source.address_line1.clone();
        destination.address_line2 = source.address_line2.clone();
        destination.address_line3 = source.address_line3.clone();
        destination.post_code = source.post_code.clone();
    }
}

impl Map<&UserEntity, UserDto> for Mapper {
    fn map(&self, source: &UserEntity) -> UserDto {
        UserDto {
            id: source.id,
            first_name: source.first_name.clone(),
            middle_name: source.middle_name.clone(),
            last_name: source.last_name.clone(),
            email: source.email.clone(),
            address_id: source.address_id,
        }
    }
}

impl Map<&UserDto, UserEntity> for Mapper {
    fn map(&self, source: &UserDto) -> UserEntity {
        UserEntity {
            id: source.id,
            first_name: source.first_name.clone(),
            middle_name: source.middle_name.clone(),
            last_name: source.last_name.clone(),
            email: source.email.clone(),
            address_id: source.address_id,
        }
    }
}

impl Map<&UserToManipulateDto, UserEntity> for Mapper {
    fn map(&self, source: &UserToManipulateDto) -> UserEntity {
        let mut user = UserEntity::default();
        self.map_onto(source, &mut user);
        user
    }
}

impl MapOnto<&UserToManipulateDto, UserEntity> for Mapper {
    fn map_onto(&self, source: &UserToManipulateDto, destination: &mut UserEntity) {
        destination.first_name = source.first_name.clone();
        destination.middle_name = source.middle_name.clone();
        destination.last_name = source.last_name.clone();
        destination.email = source.email.clone();
        destination.address_id = source.address_id;
    }
}
