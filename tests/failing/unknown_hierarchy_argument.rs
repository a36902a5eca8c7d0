use strata::HierarchyType;

#[derive(HierarchyType)]
pub struct Animal;

#[derive(HierarchyType)]
#[hierarchy(parent = Animal, table = "dogs")]
pub struct Dog;

fn main() {
    let _ = (Animal, Dog);
}
