mod product;

pub(super) use product::InMemProductRepo;
