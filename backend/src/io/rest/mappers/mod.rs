pub mod cow_mapper;
pub mod member_mapper;
pub mod ranch_mapper;

pub use cow_mapper::CowMapper;
pub use member_mapper::MemberMapper;
pub use ranch_mapper::RanchMapper;
