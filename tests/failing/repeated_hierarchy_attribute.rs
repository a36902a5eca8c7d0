use strata::HierarchyType;

#[derive(HierarchyType)]
pub struct Animal;

#[derive(HierarchyType)]
#[hierarchy(parent = Animal)]
#[hierarchy(name = "Hound")]
pub struct Dog;

fn main() {
    let _ = (Animal, Dog);
}
