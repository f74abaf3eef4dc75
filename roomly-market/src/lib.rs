//! Marketplace stores: rooms, room-seeking posts, bookings, contracts and
//! bills, each wired onto the generic store slices of `roomly-store`.

pub mod bills;
pub mod bookings;
pub mod contracts;
pub mod rooms;
pub mod seeking;
pub mod stores;

pub use bills::{Bill, BillFilters, BillStatus, BillStore, CreateBill, UpdateBill};
pub use bookings::{
    Approval, Booking, BookingFilters, BookingStatus, BookingStore, CreateBooking, Rental,
    RentalTerms, UpdateBooking,
};
pub use contracts::{Contract, ContractFilters, ContractPdf, ContractStatus, ContractStore, PdfState};
pub use rooms::{CreateRoom, Room, RoomFilters, RoomStore, UpdateRoom};
pub use seeking::{
    RoomSeekingDraft, RoomSeekingFilters, RoomSeekingPost, RoomSeekingSnapshot, RoomSeekingStore,
};
pub use stores::{MarketStores, SetupError};

pub mod prelude {
    //! Re-exports of the most commonly used marketplace types.
    pub use crate::{
        Bill, BillStore, Booking, BookingStore, Contract, ContractStore, MarketStores, Room,
        RoomSeekingPost, RoomSeekingStore, RoomStore,
    };
}
