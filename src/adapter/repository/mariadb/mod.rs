mod product;

pub(super) use product::MariadbProductRepo;
