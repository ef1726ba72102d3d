//----------------------------------------------Enums

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightState {
    On,
    Off,
}

//----------------------------------------------Structs

/// A row of call lamps, one per elevator, all off at init
#[derive(Clone, Debug, PartialEq)]
pub struct Lamp {
    pub light_states: Vec<LightState>,
}

impl Lamp {
    pub fn init(num_lamps: u8) -> Lamp {
        Lamp {
            light_states: vec![LightState::Off; num_lamps as usize],
        }
    }

    pub fn set_light_state(&mut self, index: u8, new_state: LightState) {
        if let Some(light) = self.light_states.get_mut(index as usize) {
            *light = new_state;
        }
    }

    pub fn is_on(&self, index: u8) -> bool {
        self.light_states.get(index as usize) == Some(&LightState::On)
    }
}

/// One floor of the building with its request lamps
#[derive(Clone, Debug, PartialEq)]
pub struct Floor {
    pub floor_number: u8,
    pub lamp: Lamp,
}

impl Floor {
    pub fn init(floor_number: u8, num_elevators: u8) -> Floor {
        Floor {
            floor_number,
            lamp: Lamp::init(num_elevators),
        }
    }
}
